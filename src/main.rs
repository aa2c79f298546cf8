// This file is part of the product Pulsedesk.
// SPDX-FileCopyrightText: 2026 Pulsedesk Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use actix_web::{middleware::Logger, web, App, HttpServer};
use log::{info, LevelFilter};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

mod app_state;
mod auth;
mod companies;
mod config;
mod csrf;
mod pages;
mod security;
mod sessions;
mod templates;

use app_state::AppState;
use auth::{EmployeeService, FileEmployeeStore};
use config::AppConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let runtime_root = match parse_args(std::env::args().skip(1)) {
        Ok(root) => root,
        Err(error) => {
            eprintln!("Invalid command line arguments: {}", error);
            eprintln!("Use -C <root> to set the runtime directory.");
            std::process::exit(1);
        }
    };

    env_logger::Builder::from_default_env()
        .filter_level(LevelFilter::Info)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}: {}",
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f UTC"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    let (config, created) = match AppConfig::load_or_create(&runtime_root) {
        Ok(loaded) => loaded,
        Err(error) => {
            eprintln!("Configuration error: {}", error);
            std::process::exit(1);
        }
    };
    if created {
        info!(
            "Wrote default {} to {}",
            config::CONFIG_FILE_NAME,
            runtime_root.display()
        );
    }

    let store = match FileEmployeeStore::new(AppConfig::data_file(&runtime_root)) {
        Ok(store) => Arc::new(store),
        Err(error) => {
            eprintln!("Failed to open portal data store: {}", error);
            std::process::exit(1);
        }
    };
    let service = match EmployeeService::new(store, config.password.clone()) {
        Ok(service) => service,
        Err(error) => {
            eprintln!("Failed to initialize employee service: {}", error);
            std::process::exit(1);
        }
    };
    let service = web::Data::new(service);

    let upload_dir = AppConfig::upload_dir(&runtime_root);
    let state = web::Data::new(AppState::new(&config, upload_dir));

    let bind_address = (config.server.host.clone(), config.server.port);
    info!(
        "Starting portal on http://{}:{}",
        config.server.host, config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(service.clone())
            .wrap(Logger::new(
                r#"%a "%r" %s %b "%{Referer}i" "%{User-Agent}i" %T"#,
            ))
            .configure(pages::configure_pages)
    })
    .workers(config.server.workers)
    .bind(bind_address)?
    .run()
    .await
}

fn parse_args<I>(args: I) -> Result<PathBuf, String>
where
    I: IntoIterator<Item = String>,
{
    let mut runtime_root = PathBuf::from(".");
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "-C" {
            let value = args
                .next()
                .ok_or_else(|| "Missing value for -C".to_string())?;
            runtime_root = PathBuf::from(value);
        } else {
            return Err(format!("Unknown argument: {}", arg));
        }
    }
    Ok(runtime_root)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn parse_args_defaults_to_current_directory() {
        let root = parse_args(Vec::new()).expect("parse args");
        assert_eq!(root, PathBuf::from("."));
    }

    #[test]
    fn parse_args_accepts_runtime_root() {
        let root = parse_args(args(&["-C", "runtime"])).expect("parse args");
        assert!(root.ends_with("runtime"));
    }

    #[test]
    fn parse_args_rejects_missing_value() {
        assert!(parse_args(args(&["-C"])).is_err());
        assert!(parse_args(args(&["--bogus"])).is_err());
    }
}
