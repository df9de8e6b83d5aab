//! # Voxel Terrain Entry Point
//!
//! Calls into the library's `run()` function to build and mesh a world around
//! the origin.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- world.json
//! ```

fn main() {
    if let Err(error) = voxel_terrain::run() {
        log::error!("{}", error);
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}
