use anyhow::Result;
use std::path::PathBuf;

use crate::layout::{LayoutConfig, LayoutKind};
use crate::timeline::MIN_VISIBLE_WIDTH;

/// Persistent data structure that holds the user's view settings.
/// If the data structure changes, it should be versioned to maintain
/// compatibility with data saved using older versions of traceview.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum PersistentData {
    V1(ViewSettingsV1),
}

impl Default for PersistentData {
    fn default() -> Self {
        PersistentData::V1(ViewSettingsV1::default())
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ViewSettingsV1 {
    /// Which layout algorithm the dependency view uses.
    pub layout: LayoutKind,
    /// Physics and canvas parameters for the layout engine.
    pub physics: LayoutConfig,
    /// Minimum relative bar width, keeps zero-duration spans clickable.
    pub min_bar_width: f64,
}

impl Default for ViewSettingsV1 {
    fn default() -> Self {
        Self {
            layout: LayoutKind::default(),
            physics: LayoutConfig::default(),
            min_bar_width: MIN_VISIBLE_WIDTH,
        }
    }
}

pub fn save_view_settings(settings: &ViewSettingsV1) -> Result<()> {
    let data = PersistentData::V1(settings.clone());
    write_data(&data)
}

pub fn load_view_settings() -> Result<ViewSettingsV1> {
    let data = read_data()?;
    match data {
        PersistentData::V1(settings) => Ok(settings),
    }
}

fn write_data(data: &PersistentData) -> Result<()> {
    let persistent_data_file = persistent_data_file_path();
    println!(
        "Writing persistent data to {}",
        persistent_data_file.display()
    );

    // Create the directory if it doesn't exist
    std::fs::create_dir_all(persistent_data_folder())?;

    // First write the data to a temporary file
    let write_file_path = temporary_write_file_path();
    let mut file = std::fs::File::create(&write_file_path)?;
    serde_json::to_writer_pretty(&mut file, &data)?;
    file.sync_all()?;

    // Then move the temporary file to the final location
    // Makes things more robust against crashes
    std::fs::rename(&write_file_path, persistent_data_file)?;

    Ok(())
}

fn read_data() -> Result<PersistentData> {
    let path = persistent_data_file_path();
    if !path.try_exists()? {
        return Ok(PersistentData::default());
    }
    let file = std::fs::File::open(&path)?;
    let data: PersistentData = serde_json::from_reader(file)?;
    Ok(data)
}

fn persistent_data_folder() -> PathBuf {
    directories::ProjectDirs::from("org", "traceview", "traceview")
        .unwrap()
        .data_dir()
        .to_path_buf()
}

fn persistent_data_file_path() -> PathBuf {
    persistent_data_folder().join("view_settings.json")
}

fn temporary_write_file_path() -> PathBuf {
    let random_number: u64 = rand::random();
    persistent_data_folder().join(format!("temporary_view_settings{}.json", random_number))
}
