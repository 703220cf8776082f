use rjsf_layout::{FieldChange, LayoutGridField, LayoutGridProps, LookupTable};
use rjsf_utils::DefaultSchemaUtils;
use serde::Serialize;
use serde_json::Value;

use crate::args::FormArgs;
use crate::util::{parse_value, print_json};

#[derive(clap::Args)]
pub struct Args {
    #[command(flatten)]
    pub form: FormArgs,

    /// Grid leaf of the union field: its dotted path, or the JSON leaf
    /// object carrying `name` and presentation options
    pub field: String,

    /// Selector value of the branch to switch to (JSON, or a bare string)
    pub value: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SwitchOutput {
    change: FieldChange,
    form_data: Value,
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
    let leaf = parse_value(&args.field);
    let selected = parse_value(&args.value);
    let (change, form_data) = field.on_option_change(&props, &leaf, Some(&selected))?;
    print_json(&SwitchOutput { change, form_data }, args.form.pretty)
}
