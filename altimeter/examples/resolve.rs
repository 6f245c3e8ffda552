//! Resolve a configuration file and query a few places.
//!
//! Run with: cargo run --example resolve -- conf/altimeter.cfg

use altimeter::{ConfigResolver, PluginRegistry};
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = env::args().nth(1).unwrap_or_else(|| {
        eprintln!("Usage: cargo run --example resolve -- /path/to/altimeter.cfg");
        std::process::exit(1);
    });

    let registry = PluginRegistry::builtin();
    println!("Available backends: {:?}", registry.names().collect::<Vec<_>>());

    let config = ConfigResolver::new(&registry).resolve_path(&path)?;
    println!(
        "Serving '{}' on {}:{}",
        config.server.handler, config.server.host, config.server.port
    );

    let locations = [
        ("Mount Fuji, Japan", 35.3606, 138.7274),
        ("Mount Everest, Nepal", 27.9881, 86.9250),
        ("Denali, Alaska", 63.0695, -151.0074),
    ];

    for (name, lat, lng) in &locations {
        match config.backend.lookup(*lat, *lng) {
            Ok(Some(alt)) => println!("{}: {}m", name, alt),
            Ok(None) => println!("{}: no data", name),
            Err(e) => println!("{}: error - {}", name, e),
        }
    }

    Ok(())
}
