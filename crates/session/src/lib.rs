pub mod comparison;
pub mod selection;
pub mod session;
pub mod single_view;
pub mod zoom;

pub use comparison::*;
pub use selection::*;
pub use session::*;
pub use single_view::*;
pub use zoom::*;

#[cfg(test)]
pub(crate) mod fixtures {
    use formats::{ManifestDocument, ManifestIndex};

    /// Run 101 has `temp` at "000"/"010" for conversion C (3 samples at
    /// "000", 2 at "010") and `temp` at "005" for conversion K only. Run 124
    /// has `salt` only.
    pub fn manifest() -> ManifestIndex {
        let payload = r#"{
            "runs": {
                "124": {
                    "salt": { "000": { "C": ["124/salt_000_t1.png", "124/salt_000_t2.png"] } }
                },
                "101": {
                    "temp": {
                        "010": { "C": ["101/temp_010_t1.png", "101/temp_010_t2.png"] },
                        "000": { "C": ["101/temp_000_t1.png", "101/temp_000_t2.png", "101/temp_000_t3.png"] },
                        "005": { "K": ["101/temp_005_t1.png"] }
                    }
                }
            }
        }"#;
        ManifestIndex::new(ManifestDocument::from_json_str(payload).expect("fixture parses"))
    }
}
