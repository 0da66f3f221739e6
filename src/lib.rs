//! # FasterDL Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per altri consumatori
//!
//! ## Architettura dei moduli:
//! - `config`: Gestione configurazione e validazione parametri
//! - `error`: Tipi di errore custom
//! - `classifier`: Allow-list delle estensioni distribuibili
//! - `compressor`: Backend bzip2 in-process e 7-Zip esterno
//! - `platform` / `tool_resolver`: Probe del compressore esterno
//! - `file_manager`: Discovery file e operazioni su directory
//! - `pipeline`: Pipeline concorrente classify-copy-compress
//! - `progress`: Progress bar e statistiche finali
//! - `manifest`: File resource Lua per il game server
//! - `json_output`: Eventi JSON per uso programmatico
//! - `packager`: Orchestratore di una run completa
//!
//! ## Utilizzo:
//! ```rust,ignore
//! use fasterdl::{Config, Packager};
//!
//! let packager = Packager::new(&path, Config::default(), None)?;
//! let report = packager.run().await?;
//! println!("{}", report.summary.format_summary());
//! ```

pub mod classifier;
pub mod compressor;
pub mod config;
pub mod error;
pub mod file_manager;
pub mod json_output;
pub mod manifest;
pub mod packager;
pub mod pipeline;
pub mod platform;
pub mod progress;
pub mod tool_resolver;
pub mod utils;

pub use classifier::Classifier;
pub use compressor::{Bzip2Compressor, Compressor, SevenZipCompressor};
pub use config::{CompressorPreference, Config, ManifestMode};
pub use error::FastDlError;
pub use manifest::ManifestWriter;
pub use packager::{Packager, RunReport};
pub use pipeline::{Coordinator, FileOutcome, FileRecord, PathResolver};
pub use progress::{ProgressReporter, RunSummary};
