use std::env;
use std::error::Error;
use std::fs;
use std::path::Path;
use std::process;

use gdlg_tools::{gdlg, rsl::RslArchive};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <files-or-folders>...", args[0]);
        eprintln!("  .rsl    unpack archive entries into a sibling folder");
        eprintln!("  .gdlg   decode dialogue to an editable .txt");
        eprintln!("  .txt    re-encode against the sibling .GDLG");
        eprintln!("  folder  repack entries into <folder>.RSL.new");
        process::exit(1);
    }

    let mut failed = false;
    for arg in &args[1..] {
        if let Err(e) = process_path(Path::new(arg)) {
            eprintln!("ERROR: {}: {}", arg, e);
            failed = true;
        }
    }
    if failed {
        process::exit(1);
    }
}

/// Dispatch one input path on its extension (or on being a directory).
fn process_path(path: &Path) -> Result<(), Box<dyn Error>> {
    if path.is_dir() {
        return repack_rsl_dir(path);
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "rsl" => unpack_rsl(path),
        "gdlg" => unpack_gdlg(path),
        "txt" => repack_gdlg(path),
        _ => Err(format!("unrecognized file type: {}", path.display()).into()),
    }
}

fn unpack_gdlg(path: &Path) -> Result<(), Box<dyn Error>> {
    println!("Decoding {}", path.display());
    let bytes = fs::read(path)?;
    let text = gdlg::unpack(&bytes)?;
    let out = path.with_extension("txt");
    fs::write(&out, text)?;
    println!("  -> {}", out.display());
    Ok(())
}

fn repack_gdlg(txt: &Path) -> Result<(), Box<dyn Error>> {
    let original_path = txt.with_extension("GDLG");
    println!(
        "Re-encoding {} against {}",
        txt.display(),
        original_path.display()
    );
    let original = fs::read(&original_path)?;
    let markup = fs::read_to_string(txt)?;
    let rebuilt = gdlg::repack(&original, &markup)?;

    let stem = txt.file_stem().and_then(|s| s.to_str()).unwrap_or("out");
    let out = txt.with_file_name(format!("{}-new.GDLG", stem));
    fs::write(&out, rebuilt)?;
    println!("  -> {}", out.display());
    Ok(())
}

fn unpack_rsl(path: &Path) -> Result<(), Box<dyn Error>> {
    println!("Unpacking {}", path.display());
    let bytes = fs::read(path)?;
    let archive = RslArchive::parse(&bytes)?;

    let dir = path.with_extension("");
    fs::create_dir_all(&dir)?;
    for entry in &archive.entries {
        fs::write(dir.join(&entry.name), &entry.data)?;
    }
    if !archive.trailer.is_empty() {
        fs::write(dir.join("Trailer"), &archive.trailer)?;
    }
    println!("  -> {} entries in {}", archive.entries.len(), dir.display());
    Ok(())
}

/// Repack a previously unpacked folder against its sibling `.RSL`.
fn repack_rsl_dir(dir: &Path) -> Result<(), Box<dyn Error>> {
    let rsl_path = dir.with_extension("RSL");
    println!("Repacking {} against {}", dir.display(), rsl_path.display());
    let bytes = fs::read(&rsl_path)?;
    let mut archive = RslArchive::parse(&bytes)?;

    for entry in &mut archive.entries {
        let replacement = dir.join(&entry.name);
        if replacement.exists() {
            entry.data = fs::read(replacement)?;
        }
    }
    let trailer_file = dir.join("Trailer");
    if trailer_file.exists() {
        archive.trailer = fs::read(trailer_file)?;
    }

    let out = rsl_path.with_extension("RSL.new");
    fs::write(&out, archive.repack())?;
    println!("  -> {}", out.display());
    Ok(())
}
