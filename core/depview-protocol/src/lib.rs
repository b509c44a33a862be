#![no_std] // The graph core builds for embedded and WASM hosts too

extern crate alloc;

// Enable std if the feature is active (for tests/tools)
#[cfg(any(feature = "std", test))]
extern crate std;

pub mod ids;
pub mod index;
pub mod interface;
pub mod print;

// Re-export core types for convenience
pub use ids::TreeNodeId;
pub use index::NodeIndex;
pub use interface::{GrammaticalStructure, Lemmatizer, TerminalNode, TreePrinter};
pub use print::{PrintMode, UnknownPrintMode};

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use rkyv::{from_bytes, to_bytes};

    #[test]
    fn test_handles_archive_as_validated_words() {
        let handles: Vec<TreeNodeId> = [3u32, 1, 4, 1, 5].into_iter().map(TreeNodeId::from).collect();

        let bytes = to_bytes::<_, 64>(&handles).expect("serialize");
        let archived = rkyv::check_archived_root::<Vec<TreeNodeId>>(&bytes).expect("validate");
        let words: Vec<u32> = archived.iter().map(|h| h.0).collect();
        assert_eq!(words, [3, 1, 4, 1, 5]);

        // Handles stay plain u32 words
        assert_eq!(core::mem::size_of::<TreeNodeId>(), 4);
        assert_eq!(u32::from(TreeNodeId::new(9)), TreeNodeId::from(9).get());
    }

    #[test]
    fn test_print_mode_names() {
        for mode in PrintMode::ALL {
            assert_eq!(mode.as_str().parse::<PrintMode>(), Ok(mode));
        }
        assert_eq!("PENN".parse::<PrintMode>(), Ok(PrintMode::Penn));
        assert!("latex".parse::<PrintMode>().is_err());
    }

    #[test]
    fn test_print_mode_archive() {
        let bytes = to_bytes::<_, 16>(&PrintMode::TypedDependenciesCollapsed).expect("serialize");
        let mode: PrintMode = from_bytes(&bytes).expect("deserialize");
        assert_eq!(mode, PrintMode::TypedDependenciesCollapsed);
    }
}
