pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Eight hex characters, used for media stream and track labels.
pub fn new_short_id() -> String {
    let uuid = uuid::Uuid::new_v4();
    let bytes = uuid.as_bytes();
    format!(
        "{:02x}{:02x}{:02x}{:02x}",
        bytes[0], bytes[1], bytes[2], bytes[3]
    )
}
