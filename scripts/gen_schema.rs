use release_scribe::changelog::schema::default_schema;

fn main() {
    let schema = default_schema();
    let schema_string = serde_json::to_string_pretty(&schema).unwrap();
    println!("{}", schema_string);
}
