use pulse_engine::parser::link::extract_subject_id;

#[test]
fn extracts_19_digit_id_from_url() {
    let link = "https://example.com/video/7234567890123456789?lang=en";
    assert_eq!(
        extract_subject_id(link),
        Some("7234567890123456789".to_string())
    );
}

#[test]
fn extracts_18_digit_id() {
    assert_eq!(
        extract_subject_id("id=123456789012345678"),
        Some("123456789012345678".to_string())
    );
}

#[test]
fn bare_id_matches() {
    assert_eq!(
        extract_subject_id("7234567890123456789"),
        Some("7234567890123456789".to_string())
    );
}

#[test]
fn longer_run_yields_its_first_19_digits() {
    assert_eq!(
        extract_subject_id("123456789012345678901"),
        Some("1234567890123456789".to_string())
    );
}

#[test]
fn seventeen_digit_run_never_matches() {
    assert_eq!(
        extract_subject_id("https://example.com/video/12345678901234567"),
        None
    );
}

#[test]
fn no_digits_returns_none() {
    assert_eq!(extract_subject_id("https://example.com/about"), None);
}

#[test]
fn empty_input_returns_none() {
    assert_eq!(extract_subject_id(""), None);
}

#[test]
fn first_qualifying_run_wins() {
    let link = "v=1111&id=123456789012345678&alt=9999999999999999999";
    assert_eq!(
        extract_subject_id(link),
        Some("123456789012345678".to_string())
    );
}
