use dmg_core::State;
use std::{env, fs, path::Path};

/// Loads a ROM, runs the core for one frame's worth of cycles, and dumps the
/// resulting framebuffer as raw RGBA8888 next to the ROM. Stands in for the
/// windowed presentation layer the core itself does not depend on.
fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <rom_path>", args[0]);
        std::process::exit(1);
    }

    let rom_path = Path::new(&args[1]);
    let rom = fs::read(rom_path).unwrap_or_else(|e| {
        eprintln!("failed to read ROM '{}': {}", rom_path.display(), e);
        std::process::exit(1);
    });

    let mut state = State::new(rom);
    let mut frame = Vec::new();

    let mut cycles_run = 0u64;
    while cycles_run < 70_224 {
        let consumed = match state.cpu_step() {
            Ok(c) => c,
            Err(err) => {
                eprintln!("core aborted: {}", err);
                std::process::exit(1);
            }
        };
        for _ in 0..consumed {
            state.ppu_step(|fb| frame = fb.to_vec());
        }
        cycles_run += consumed as u64;
    }

    let out_path = rom_path.with_extension("rgba");
    let bytes: Vec<u8> = frame.iter().flat_map(|px| px.to_be_bytes()).collect();
    fs::write(&out_path, &bytes).unwrap_or_else(|e| {
        eprintln!("failed to write '{}': {}", out_path.display(), e);
        std::process::exit(1);
    });
    println!(
        "wrote {} bytes of framebuffer to {}",
        bytes.len(),
        out_path.display()
    );
}
