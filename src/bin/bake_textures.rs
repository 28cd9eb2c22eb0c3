//! Texture baker binary. Writes the procedural textures to PNG so they
//! can be inspected, or shipped pre-baked instead of generated at load.
//!
//! Usage: cargo run --release --bin bake_textures -- [OPTIONS]
//!
//! Options:
//!   --size <N>         Noise texture size (default: 256)
//!   --seed <SEED>      Noise seed (default: 42)
//!   --lut-size <N>     Color LUT cube resolution (default: 32)
//!   --contrast <C>     LUT contrast (default: 1.0)
//!   --saturation <S>   LUT saturation (default: 1.0)
//!   --out <DIR>        Output directory (default: "baked")
//!
//! Output structure:
//!   <dir>/
//!     manifest.json    # Bake parameters + file list
//!     noise.png
//!     blue_noise.png
//!     color_lut.png    # (size*size) x size strip

use std::path::PathBuf;
use std::time::Instant;

use serde_json::json;

use geokern::texture::{LutParams, blue_noise, color_lut, noise};

fn main() {
    geokern::core::logging::init();

    let args: Vec<String> = std::env::args().collect();
    let size = parse_u32_arg(&args, "--size").unwrap_or(256);
    let seed = parse_u32_arg(&args, "--seed").unwrap_or(42);
    let lut_size = parse_u32_arg(&args, "--lut-size").unwrap_or(32);
    let contrast = parse_f32_arg(&args, "--contrast").unwrap_or(1.0);
    let saturation = parse_f32_arg(&args, "--saturation").unwrap_or(1.0);
    let out = parse_str_arg(&args, "--out").unwrap_or_else(|| "baked".to_string());

    let output_dir = PathBuf::from(out);
    std::fs::create_dir_all(&output_dir).expect("Failed to create output directory");

    println!("=== geokern Texture Baker ===");
    println!("Noise: {}x{} seed {}", size, size, seed);
    println!("LUT:   {}^3 contrast {} saturation {}", lut_size, contrast, saturation);
    println!("Output: {}", output_dir.display());
    println!();

    let start = Instant::now();

    let noise_data = noise(size, seed);
    save_png(&output_dir, "noise.png", size, size, noise_data);

    let blue_data = blue_noise(size, seed);
    save_png(&output_dir, "blue_noise.png", size, size, blue_data);

    let params = LutParams { contrast, saturation };
    let lut_data = color_lut(lut_size, &params).expect("Invalid LUT parameters");
    save_png(&output_dir, "color_lut.png", lut_size * lut_size, lut_size, lut_data);

    let manifest = json!({
        "seed": seed,
        "textures": [
            { "name": "noise", "file": "noise.png", "size": size },
            { "name": "blue_noise", "file": "blue_noise.png", "size": size },
            {
                "name": "color_lut",
                "file": "color_lut.png",
                "size": lut_size,
                "contrast": contrast,
                "saturation": saturation,
            },
        ],
    });
    let manifest_path = output_dir.join("manifest.json");
    std::fs::write(&manifest_path, serde_json::to_string_pretty(&manifest).unwrap())
        .expect("Failed to write manifest");

    println!();
    println!("=== Bake Complete ===");
    println!("Took:   {:.2}s", start.elapsed().as_secs_f64());
    println!("Output: {}", output_dir.display());
}

fn save_png(dir: &std::path::Path, name: &str, width: u32, height: u32, data: Vec<u8>) {
    let image = image::RgbaImage::from_raw(width, height, data)
        .expect("Texture buffer does not match image dimensions");
    let path = dir.join(name);
    image.save(&path).expect("Failed to write PNG");
    log::info!("wrote {}", path.display());
}

fn parse_f32_arg(args: &[String], flag: &str) -> Option<f32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_u32_arg(args: &[String], flag: &str) -> Option<u32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.clone())
}
