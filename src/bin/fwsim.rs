//! Simulador no host: usa um diretório como cartão SD, carrega um jogo,
//! finge jogar por um tempo e deixa o autosave trabalhar.
//!
//! Uso: fwsim <dir-sd> <nome-rom> <bsram-kb> [segundos] [--raw]

use log::{error, info};
use sdcart_persist::{
    AutosaveEvent, Console, DirStorage, Firmware, FirmwareConfig, LoadOutcome, LogSink, RomInfo, RomList,
    SlotFormat,
};
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

const FRAME: Duration = Duration::from_micros(16_667);

fn usage() -> ExitCode {
    eprintln!("uso: fwsim <dir-sd> <nome-rom> <bsram-kb> [segundos] [--raw]");
    ExitCode::from(2)
}

fn console_for(rom: &str) -> Console {
    match Path::new(rom).extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("nes") => Console::Nes,
        _ => Console::Snes,
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let mut raw = false;
    let mut args = Vec::new();
    for arg in std::env::args().skip(1) {
        if arg == "--raw" {
            raw = true;
        } else {
            args.push(arg);
        }
    }

    let (sd_dir, rom_name, kb_arg) = match args.as_slice() {
        [dir, rom, kb, ..] => (dir.clone(), rom.clone(), kb.clone()),
        _ => return usage(),
    };
    let Ok(bsram_kb) = kb_arg.parse::<usize>() else {
        return usage();
    };
    let seconds = match args.get(3).map(|s| s.parse::<u64>()) {
        None => 30,
        Some(Ok(s)) => s,
        Some(Err(_)) => return usage(),
    };

    let mut config = FirmwareConfig::default();
    if raw {
        config = config.with_slot_format(SlotFormat::Raw);
    }

    let roms = RomList::new(vec![RomInfo::new(rom_name.clone(), console_for(&rom_name), bsram_kb)]);
    let mut firmware = Firmware::new(DirStorage::new(&sd_dir), roms, config);
    let mut ui = LogSink;

    match firmware.load_game(0, &mut ui) {
        LoadOutcome::Ok => {}
        outcome => {
            error!("Falha ao carregar: {:?}", outcome);
            return ExitCode::from(outcome.code());
        }
    }

    let frames = seconds * 60;
    let mut commits = 0u32;
    let mut failures = 0u32;
    for frame in 0..frames {
        // O jogo grava o progresso uma vez por segundo
        if frame % 60 == 0 {
            if let Some(session) = firmware.session_mut() {
                let counter = session.bsram().read_byte(0).wrapping_add(1);
                session.bsram_mut().write_byte(0, counter);
            }
        }
        match firmware.autosave_tick(FRAME) {
            AutosaveEvent::Committed => commits += 1,
            AutosaveEvent::Failed => failures += 1,
            AutosaveEvent::Idle => {}
        }
    }

    if firmware.unload() == AutosaveEvent::Committed {
        commits += 1;
    }

    info!("Simulados {} s: {} commits, {} falhas", seconds, commits, failures);
    println!("{} commits, {} falhas", commits, failures);
    ExitCode::SUCCESS
}
