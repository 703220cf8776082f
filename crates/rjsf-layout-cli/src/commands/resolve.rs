use rjsf_layout::{SchemaCache, SchemaPathResolver};
use rjsf_utils::DefaultSchemaUtils;

use crate::args::FormArgs;
use crate::util::print_json;

#[derive(clap::Args)]
pub struct Args {
    #[command(flatten)]
    pub form: FormArgs,

    /// Dotted field path, e.g. `person.pets.0.name`
    pub path: String,
}

pub fn run(args: Args) -> anyhow::Result<()> {
    let form = args.form.load()?;
    let utils = DefaultSchemaUtils::new(form.schema.clone());
    let cache = SchemaCache::new();
    let resolver = SchemaPathResolver::new(&utils, &cache, &form.config.ids);
    let info = resolver.resolve(&form.schema, &args.path, form.form_data.as_ref(), &form.root_id);
    print_json(&info, args.form.pretty)
}
