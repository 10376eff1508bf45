use pulse_engine::metrics;

#[test]
fn registered_metrics_render_in_text_exposition() {
    metrics::register_metrics();
    metrics::REQUESTS_TOTAL.inc();

    let rendered = metrics::render_metrics();
    assert!(rendered.contains("pulse_requests_total"));
    assert!(rendered.contains("pulse_success_total"));
    assert!(rendered.contains("pulse_run_active"));
}

#[test]
fn double_registration_is_harmless() {
    metrics::register_metrics();
    metrics::register_metrics();

    let rendered = metrics::render_metrics();
    assert!(rendered.contains("pulse_requests_total"));
}
