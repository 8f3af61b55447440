//! CLI command handlers, shared by the subcommands and the menu.

mod bench;
mod compress;
mod decompress;
mod run;

pub use bench::{run_bench, BenchArgs};
pub use compress::run_compress;
pub use decompress::run_decompress;
pub use run::ensure_all_succeeded;
