use std::path::PathBuf;

use rjsf_layout::{LayoutGridField, LayoutGridProps, LookupTable};
use rjsf_utils::DefaultSchemaUtils;
use tracing::debug;

use crate::args::FormArgs;
use crate::util::{print_json, read_json};

#[derive(clap::Args)]
pub struct Args {
    #[command(flatten)]
    pub form: FormArgs,

    /// Grid description to render; defaults to the UI schema's `ui:layoutGrid`
    #[arg(short, long)]
    pub grid: Option<PathBuf>,
}

pub fn run(args: Args) -> anyhow::Result<()> {
    let form = args.form.load()?;
    let utils = DefaultSchemaUtils::new(form.schema.clone());
    let context = LookupTable::from_config(&form.config);
    let field = LayoutGridField::new(&utils, &context, &form.config);
    let props = LayoutGridProps {
        schema: &form.schema,
        ui_schema: form.ui_schema.as_ref(),
        form_data: form.form_data.as_ref(),
        error_schema: form.error_schema.as_ref(),
        field_path_id: &form.root_id,
        readonly: args.form.readonly,
        disabled: args.form.disabled,
    };

    let nodes = match &args.grid {
        Some(path) => field.render_grid(&read_json(path)?, &props)?,
        None => field.render(&props)?,
    };
    debug!(nodes = nodes.len(), "rendered layout grid");
    print_json(&nodes, args.form.pretty)
}
