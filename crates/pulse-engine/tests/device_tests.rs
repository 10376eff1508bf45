use std::io::Write;
use std::path::Path;

use pulse_engine::engine::devices::{load_devices, DeviceIdentity};

fn write_pool(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write pool");
    file
}

#[test]
fn parses_four_field_lines() {
    let pool = write_pool("d1:i1:c1:o1\nd2:i2:c2:o2\n");
    let devices = load_devices(pool.path()).expect("pool loads");

    assert_eq!(devices.len(), 2);
    assert_eq!(
        devices[0],
        DeviceIdentity {
            device_id: "d1".to_string(),
            install_id: "i1".to_string(),
            client_device_id: "c1".to_string(),
            open_udid: "o1".to_string(),
        }
    );
    assert_eq!(devices[1].open_udid, "o2");
}

#[test]
fn blank_and_whitespace_lines_are_discarded() {
    let pool = write_pool("\n   \nd1:i1:c1:o1\n\t\n\n");
    let devices = load_devices(pool.path()).expect("pool loads");
    assert_eq!(devices.len(), 1);
}

#[test]
fn short_lines_keep_missing_fields_empty() {
    let pool = write_pool("d1:i1\n");
    let devices = load_devices(pool.path()).expect("pool loads");

    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].device_id, "d1");
    assert_eq!(devices[0].install_id, "i1");
    assert_eq!(devices[0].client_device_id, "");
    assert_eq!(devices[0].open_udid, "");
}

#[test]
fn garbage_fields_pass_through_verbatim() {
    let pool = write_pool("not a device!:???:12 34:#&=\n");
    let devices = load_devices(pool.path()).expect("pool loads");

    assert_eq!(devices[0].device_id, "not a device!");
    assert_eq!(devices[0].install_id, "???");
    assert_eq!(devices[0].client_device_id, "12 34");
    assert_eq!(devices[0].open_udid, "#&=");
}

#[test]
fn extra_fields_are_ignored() {
    let pool = write_pool("a:b:c:d:e:f\n");
    let devices = load_devices(pool.path()).expect("pool loads");
    assert_eq!(devices[0].open_udid, "d");
}

#[test]
fn missing_file_is_an_error() {
    let result = load_devices(Path::new("/nonexistent/devices.txt"));
    assert!(result.is_err());
    assert_eq!(
        result.unwrap_err().kind(),
        std::io::ErrorKind::NotFound
    );
}

#[test]
fn empty_file_yields_empty_pool() {
    let pool = write_pool("");
    let devices = load_devices(pool.path()).expect("pool loads");
    assert!(devices.is_empty());
}
