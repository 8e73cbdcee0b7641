//! # photo-dedup CLI
//!
//! Command-line interface for the duplicate photo finder.
//!
//! ## Usage
//! ```bash
//! photo-dedup scan ~/Pictures --workers 20 --hash-size 16
//! photo-dedup report --cache image_hashes.json --report duplicates.json
//! ```

mod cli;

use photo_dedup::Result;

fn main() -> Result<()> {
    cli::run()
}
