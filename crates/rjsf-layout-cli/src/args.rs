//! Shared argument definitions.

use std::path::PathBuf;

use anyhow::Context;
use rjsf_layout::LayoutConfig;
use rjsf_utils::FieldPathId;
use serde_json::Value;

use crate::util::read_json;

/// The documents describing one form.
///
/// Embedded in each command with `#[command(flatten)]`.
#[derive(clap::Args, Clone)]
pub struct FormArgs {
    /// JSON Schema of the form (use - for stdin)
    #[arg(short, long)]
    pub schema: PathBuf,

    /// UI schema
    #[arg(short, long)]
    pub ui_schema: Option<PathBuf>,

    /// Current form data
    #[arg(short = 'd', long)]
    pub form_data: Option<PathBuf>,

    /// Error schema scoped to the form
    #[arg(short, long)]
    pub error_schema: Option<PathBuf>,

    /// Layout configuration (id prefix/separator, global options, lookup map)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Force every field readonly
    #[arg(long)]
    pub readonly: bool,

    /// Disable every field
    #[arg(long)]
    pub disabled: bool,

    /// Pretty print JSON output
    #[arg(short, long)]
    pub pretty: bool,
}

/// [`FormArgs`] with every file loaded.
pub struct LoadedForm {
    pub schema: Value,
    pub ui_schema: Option<Value>,
    pub form_data: Option<Value>,
    pub error_schema: Option<Value>,
    pub config: LayoutConfig,
    pub root_id: FieldPathId,
}

impl FormArgs {
    pub fn load(&self) -> anyhow::Result<LoadedForm> {
        let optional = |path: &Option<PathBuf>| path.as_deref().map(read_json).transpose();
        let config = match &self.config {
            Some(path) => serde_json::from_value(read_json(path)?)
                .with_context(|| format!("invalid layout config in {}", path.display()))?,
            None => LayoutConfig::default(),
        };
        let root_id = FieldPathId::root(&config.ids);
        Ok(LoadedForm {
            schema: read_json(&self.schema)?,
            ui_schema: optional(&self.ui_schema)?,
            form_data: optional(&self.form_data)?,
            error_schema: optional(&self.error_schema)?,
            config,
            root_id,
        })
    }
}
