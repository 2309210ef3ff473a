use std::io::{stdin, stdout, Read, Write};

use transit_router::error::AppError;

fn print_usage() {
    eprintln!("Usage: transit-router [make_base|process_requests]");
}

fn read_stdin() -> std::io::Result<String> {
    let mut input = String::new();
    stdin().read_to_string(&mut input)?;
    Ok(input)
}

fn run() -> Result<(), AppError> {
    let mut args = std::env::args();
    let _program = args.next();
    let mode = args.next().ok_or(AppError::Usage)?;
    if args.next().is_some() {
        return Err(AppError::Usage);
    }

    match mode.as_str() {
        "make_base" => {
            let input = read_stdin().map_err(|e| AppError::Persistence(e.into()))?;
            transit_router::request::run_make_base(&input)?;
            Ok(())
        }
        "process_requests" => {
            let input = read_stdin().map_err(|e| AppError::Persistence(e.into()))?;
            let response = transit_router::request::run_process_requests(&input)?;
            stdout().write_all(response.as_bytes()).map_err(|e| AppError::Persistence(e.into()))?;
            Ok(())
        }
        _ => Err(AppError::Usage),
    }
}

fn main() {
    if let Err(err) = run() {
        if matches!(err, AppError::Usage) {
            print_usage();
        } else {
            log::error!("{err}");
            eprintln!("{err}");
        }
        std::process::exit(1);
    }
}
