//! Example of walking a decoded value tree.
//!
//! cargo run --package marshal --example nested_access

use marshal::{Document, Value};

// {users: [{name: "Amy"}, {name: "Bob"}]}
const DATA: &[u8] =
    b"\x04\x08{\x06:\x0ausers[\x07{\x06:\x09nameI\"\x08Amy\x06:\x06ET{\x06;\x06I\"\x08Bob\x06;\x07T";

fn main() -> Result<(), marshal::Error> {
    let doc = Document::from_bytes(DATA)?;
    println!(
        "format {}.{}, {:?}",
        doc.major_version(),
        doc.minor_version(),
        doc.value_type()
    );

    // node = root["users"][1]["name"]
    let name = doc
        .root()?
        .get("users")
        .and_then(|users| users.index(1))
        .and_then(|user| user.get("name"))
        .map(Value::as_str)
        .transpose()?;
    println!("{name:?}");

    if let Some(users) = doc.root()?.get("users") {
        for user in users.as_array()? {
            for (key, value) in user.as_map()? {
                println!("{} => {}", key.as_str()?, value.as_str()?);
            }
        }
    }

    Ok(())
}
