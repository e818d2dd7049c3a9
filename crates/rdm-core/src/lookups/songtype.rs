/// Fixed song-type code table. Not user-editable.
pub const SONGTYPES: [(&str, &str); 9] = [
    ("1", "Simple Call"),
    ("2", "Common Song"),
    ("3", "Alternative Song"),
    ("4", "Alarm Call"),
    ("5", "Flight Call"),
    ("6", "Territorial Call"),
    ("7", "Sound"),
    ("8", "Duet"),
    ("9", "Mating Call"),
];

pub fn songtype_label(code: &str) -> Option<&'static str> {
    SONGTYPES
        .iter()
        .find(|(c, _)| *c == code.trim())
        .map(|(_, label)| *label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_and_unknown_codes() {
        assert_eq!(songtype_label("1"), Some("Simple Call"));
        assert_eq!(songtype_label("9"), Some("Mating Call"));
        assert_eq!(songtype_label("99"), None);
        assert_eq!(songtype_label(""), None);
    }
}
