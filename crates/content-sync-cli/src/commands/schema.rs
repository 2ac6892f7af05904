use anyhow::Result;
use content_sync::ContentSync;
use serde_json::{Map, Value};

use super::Output;

pub fn run() -> Result<Output> {
    let schema: Map<String, Value> = ContentSync::display_schema()
        .into_iter()
        .map(|column| (column.name.to_owned(), Value::from(column.title)))
        .collect();
    Output::complete(&schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_maps_columns_to_titles() {
        let output = run().unwrap();
        assert_eq!(output.body["templateId"], "Template id");
        assert_eq!(output.body["templateType"], "Template type");
        assert_eq!(output.body.as_object().unwrap().len(), 4);
    }
}
