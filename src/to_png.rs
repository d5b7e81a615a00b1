#![cfg(feature = "host")]

//! PNG previews of frames and patterns, drawn as round green LEDs.

use crate::bit_packer::BitDepth;
use crate::frame::PixelFrame;
use crate::pattern::Pattern;
use png::{BitDepth as PngBitDepth, ColorType, Encoder, ScaledFloat};
use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Render one frame into a PNG file sized to the requested maximum dimension.
///
/// Each pixel becomes a green LED whose brightness is `value / bit_depth.max_value()`.
pub fn write_frame_png(
    frame: &PixelFrame,
    bit_depth: BitDepth,
    output_path: impl AsRef<Path>,
    target_max_dimension: u32,
) -> Result<(), Box<dyn Error>> {
    let output_path = output_path.as_ref();
    let cell_size = select_cell_size(
        u32::from(frame.width()),
        u32::from(frame.height()),
        target_max_dimension,
    );
    let led_margin = (cell_size / 8).max(1);
    let (width, height, pixels) = frame_pixels(frame, bit_depth, cell_size, led_margin);
    create_parent_dir(output_path)?;

    let file = File::create(output_path)?;
    let mut encoder = Encoder::new(BufWriter::new(file), width, height);
    encoder.set_color(ColorType::Rgb);
    encoder.set_depth(PngBitDepth::Sixteen);
    encoder.set_source_gamma(ScaledFloat::new(1.0));
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&pixels)?;
    println!("wrote PNG to {}", output_path.display());
    Ok(())
}

/// Render every frame of `pattern` (storage order) into a looping APNG file.
pub fn write_pattern_apng(
    pattern: &Pattern,
    output_path: impl AsRef<Path>,
    target_max_dimension: u32,
    frame_delay_ms: u16,
) -> Result<(), Box<dyn Error>> {
    let frames = pattern.frames();
    let Some(first) = frames.first() else {
        return Err("pattern has no frames".into());
    };
    if frame_delay_ms == 0 {
        return Err("frame_delay_ms must be positive".into());
    }
    let output_path = output_path.as_ref();
    let cell_size = select_cell_size(
        u32::from(first.width()),
        u32::from(first.height()),
        target_max_dimension,
    );
    let led_margin = (cell_size / 8).max(1);
    let frame_count = u32::try_from(frames.len())?;
    let bit_depth = pattern.bit_depth();

    let (width, height, _) = frame_pixels(first, bit_depth, cell_size, led_margin);
    if let Some(frame) = frames
        .iter()
        .find(|frame| frame.width() != first.width() || frame.height() != first.height())
    {
        return Err(format!(
            "frame is {}x{}, first frame is {}x{}",
            frame.width(),
            frame.height(),
            first.width(),
            first.height()
        )
        .into());
    }
    create_parent_dir(output_path)?;

    let file = File::create(output_path)?;
    let mut encoder = Encoder::new(BufWriter::new(file), width, height);
    encoder.set_color(ColorType::Rgb);
    encoder.set_depth(PngBitDepth::Sixteen);
    encoder.set_source_gamma(ScaledFloat::new(1.0));
    encoder.set_animated(frame_count, 0)?;
    let mut writer = encoder.write_header()?;
    for frame in frames {
        let (_, _, pixels) = frame_pixels(frame, bit_depth, cell_size, led_margin);
        writer.set_frame_delay(frame_delay_ms, 1000)?;
        writer.write_image_data(&pixels)?;
    }
    writer.finish()?;
    println!("wrote APNG to {}", output_path.display());
    Ok(())
}

fn create_parent_dir(output_path: &Path) -> std::io::Result<()> {
    match output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

fn select_cell_size(frame_width: u32, frame_height: u32, target_max_dimension: u32) -> u32 {
    assert!(target_max_dimension > 0, "target_max_dimension must be positive");
    let mut cell_size = target_max_dimension;
    while cell_size > 1 {
        let led_margin = (cell_size / 8).max(1);
        let led_radius = cell_size.saturating_sub(led_margin * 2) / 2;
        let output_width = frame_width * cell_size + led_radius * 2;
        let output_height = frame_height * cell_size + led_radius * 2;
        if output_width.max(output_height) <= target_max_dimension {
            break;
        }
        cell_size -= 1;
    }
    cell_size
}

// 16-bit big-endian RGB, one disc per pixel, with a border of one LED radius.
fn frame_pixels(
    frame: &PixelFrame,
    bit_depth: BitDepth,
    cell_size: u32,
    led_margin: u32,
) -> (u32, u32, Vec<u8>) {
    let led_radius = cell_size.saturating_sub(led_margin * 2) / 2;
    let border = led_radius;
    let width = u32::from(frame.width()) * cell_size + border * 2;
    let height = u32::from(frame.height()) * cell_size + border * 2;
    let mut bytes = vec![0u8; (width * height * 3 * 2) as usize];
    if led_radius == 0 {
        return (width, height, bytes);
    }
    let fade_width = (led_radius / 3).max(1);
    let center = (cell_size - 1) as i32 / 2;
    let led_radius_f = led_radius as f32;
    let inner_radius_f = led_radius.saturating_sub(fade_width) as f32;
    let radius_sq = (led_radius as i32) * (led_radius as i32);
    let max_value = f32::from(bit_depth.max_value());

    for (row_index, row) in frame.rows().enumerate() {
        for (column_index, &value) in row.iter().enumerate() {
            if value == 0 {
                continue;
            }
            let level = (f32::from(value) / max_value).min(1.0);
            let cell_origin_x = (column_index as u32) * cell_size;
            let cell_origin_y = (row_index as u32) * cell_size;

            for local_y in 0..cell_size {
                let delta_y = local_y as i32 - center;
                for local_x in 0..cell_size {
                    let delta_x = local_x as i32 - center;
                    let distance_sq = delta_x * delta_x + delta_y * delta_y;
                    if distance_sq > radius_sq {
                        continue;
                    }
                    let distance = (distance_sq as f32).sqrt();
                    let intensity = if distance <= inner_radius_f {
                        1.0
                    } else {
                        let fade_span = led_radius_f - inner_radius_f;
                        (1.0 - (distance - inner_radius_f) / fade_span).max(0.0)
                    };
                    let x = border + cell_origin_x + local_x;
                    let y = border + cell_origin_y + local_y;
                    let pixel_index = ((y * width + x) * 3 * 2) as usize;
                    let green = linear_to_u16(level * intensity).to_be_bytes();
                    if let Some(channel) = bytes.get_mut(pixel_index + 2..pixel_index + 4) {
                        channel.copy_from_slice(&green);
                    }
                }
            }
        }
    }

    (width, height, bytes)
}

fn linear_to_u16(value: f32) -> u16 {
    let clamped = value.clamp(0.0, 1.0);
    (clamped * 65535.0).round() as u16
}
