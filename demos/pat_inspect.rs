#![cfg(feature = "host")]

//! Prints a .pat file's header and writes a PNG preview of its first frame.
//!
//! ```text
//! pat_inspect <file.pat> [G4|G4.1|G6] [preview.png]
//! ```

use arena_pattern::{arena::Generation, pat_file, pattern_codec, to_png::write_frame_png};
use std::error::Error;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let Some(input_path) = args.next().map(PathBuf::from) else {
        return Err("usage: pat_inspect <file.pat> [generation] [preview.png]".into());
    };
    let expected = args.next().map(|name| name.parse::<Generation>()).transpose()?;
    let output_path = args
        .next()
        .map_or_else(|| input_path.with_extension("png"), PathBuf::from);

    let bytes = std::fs::read(&input_path)?;
    let header = pattern_codec::decode_header(&bytes, expected)?;
    println!("file:         {}", input_path.display());
    if let Some(pattern_id) = pat_file::pattern_id_from_path(&input_path) {
        println!("pattern_id:   {pattern_id}");
    }
    println!("generation:   {}", header.generation);
    println!("version:      {:?}", header.version);
    println!(
        "frames:       {} ({} x {})",
        header.num_frames(),
        header.x_num,
        header.y_num
    );
    println!("gs levels:    {}", header.bit_depth.gs_levels());
    println!(
        "panels:       {} rows x {} installed columns",
        header.num_panel_rows, header.num_panel_cols
    );
    if let Some(columns) = &header.columns_installed {
        println!("columns:      {columns:?}");
    }
    println!("column order: {:?}", header.column_order);
    println!(
        "ids:          generation {}, arena {}, observer {}",
        header.generation_id, header.arena_id, header.observer_id
    );

    let decoded = pattern_codec::decode(&bytes, expected)?;
    let geometry = &decoded.geometry;
    println!(
        "pixels:       {} x {}, inner radius {:.1} mm",
        geometry.total_pixels_x(),
        geometry.total_pixels_y(),
        geometry.inner_radius_mm()
    );
    if let Some(first) = decoded.pattern.frames().first() {
        write_frame_png(first, decoded.pattern.bit_depth(), &output_path, 1200)?;
    }
    Ok(())
}
