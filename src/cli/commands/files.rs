//! File tool commands - sandboxed repository operations from the CLI.

use crate::cli::Output;
use crate::config::Settings;
use crate::fs_tools::{EntryKind, FileStore};

fn store(settings: &Settings) -> anyhow::Result<FileStore> {
    Ok(FileStore::new(&settings.root_dir())?)
}

/// Print a file's content to stdout.
pub fn run_read(path: &str, settings: &Settings) -> anyhow::Result<()> {
    let payload = store(settings)?.read(path)?;
    print!("{}", payload.content);
    if !payload.content.ends_with('\n') {
        println!();
    }
    Ok(())
}

/// Write content to a file.
pub fn run_write(
    path: &str,
    content: &str,
    create_dirs: bool,
    settings: &Settings,
) -> anyhow::Result<()> {
    let payload = store(settings)?.write(path, content, create_dirs)?;
    Output::success(&format!(
        "{} {} ({} bytes)",
        payload.action,
        payload.absolute_path.display(),
        payload.size_bytes
    ));
    Ok(())
}

/// Delete a file.
pub fn run_delete(path: &str, settings: &Settings) -> anyhow::Result<()> {
    store(settings)?.delete(path)?;
    Output::success(&format!("Deleted {}", path));
    Ok(())
}

/// List a directory.
pub fn run_ls(
    path: &str,
    include_hidden: bool,
    recursive: bool,
    settings: &Settings,
) -> anyhow::Result<()> {
    let entries = store(settings)?.list(path, include_hidden, recursive)?;

    if entries.is_empty() {
        Output::info("Directory is empty.");
        return Ok(());
    }

    for entry in &entries {
        match entry.kind {
            EntryKind::Directory => Output::list_item(&format!("{}/", entry.path)),
            _ => Output::list_item(&format!(
                "{} ({} bytes)",
                entry.path,
                entry.size_bytes.unwrap_or(0)
            )),
        }
    }
    Ok(())
}

/// Create a directory.
pub fn run_mkdir(path: &str, settings: &Settings) -> anyhow::Result<()> {
    store(settings)?.create_dir(path)?;
    Output::success(&format!("Created directory {}", path));
    Ok(())
}

/// Show metadata for a path.
pub fn run_info(path: &str, settings: &Settings) -> anyhow::Result<()> {
    let info = store(settings)?.stat(path)?;

    Output::header(path);
    Output::kv("Type", &info.kind.to_string());
    Output::kv("Path", &info.absolute_path.display().to_string());
    if let Some(size) = info.size_bytes {
        Output::kv("Size", &format!("{} bytes", size));
    }
    if let Some(ext) = &info.extension {
        Output::kv("Extension", ext);
    }
    if let Some(ts) = info.modified_timestamp {
        Output::kv("Modified", &ts.to_string());
    }
    if let Some(ts) = info.created_timestamp {
        Output::kv("Created", &ts.to_string());
    }
    Ok(())
}
