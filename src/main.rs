// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Amredit-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Amredit and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Amredit CLI entrypoint.
//!
//! Connects to an annotation server and runs the line-oriented editing shell over stdin.
//! Logs go to stderr, filtered by `RUST_LOG`.

use std::error::Error;

use amredit::client::http::{DEFAULT_SERVER_URL, DEFAULT_TIMEOUT_SECS};
use amredit::client::{ClientConfig, DispatchPolicy, HttpTransport, SessionClient, ViewOptions};
use amredit::controller::SessionController;
use amredit::render::TextRenderer;
use tracing_subscriber::EnvFilter;

const SERVER_ENV: &str = "AMREDIT_SERVER";

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--server <url>] [--timeout <secs>] [--start <num>]\n  \
         {program} [--compare <a,b>] [--reverse-of] [--with-alignments] [--unordered]\n  \
         {program} --help\n\n\
         --server defaults to ${SERVER_ENV}, then {DEFAULT_SERVER_URL}.\n\
         --timeout bounds each request (default {DEFAULT_TIMEOUT_SECS}s).\n\
         --compare shows two files side by side (`a,b` or `a:b`).\n\
         --unordered applies responses in arrival order instead of dropping overtaken ones.\n\n\
         Commands are read from stdin; type `help` for the list."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    server: Option<String>,
    timeout_secs: Option<u64>,
    start: Option<u32>,
    compare: Option<(u32, u32)>,
    reverse_of: bool,
    with_alignments: bool,
    unordered: bool,
    help: bool,
}

fn parse_compare(raw: &str) -> Result<(u32, u32), ()> {
    let (first, second) = raw.split_once([',', ':']).ok_or(())?;
    let first = first.trim().parse().map_err(|_| ())?;
    let second = second.trim().parse().map_err(|_| ())?;
    Ok((first, second))
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--server" => {
                if options.server.is_some() {
                    return Err(());
                }
                options.server = Some(args.next().ok_or(())?);
            }
            "--timeout" => {
                if options.timeout_secs.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                let secs: u64 = raw.parse().map_err(|_| ())?;
                if secs == 0 {
                    return Err(());
                }
                options.timeout_secs = Some(secs);
            }
            "--start" => {
                if options.start.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                let num: u32 = raw.parse().map_err(|_| ())?;
                if num == 0 {
                    return Err(());
                }
                options.start = Some(num);
            }
            "--compare" => {
                if options.compare.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                options.compare = Some(parse_compare(&raw)?);
            }
            "--reverse-of" => {
                if options.reverse_of {
                    return Err(());
                }
                options.reverse_of = true;
            }
            "--with-alignments" => {
                if options.with_alignments {
                    return Err(());
                }
                options.with_alignments = true;
            }
            "--unordered" => {
                if options.unordered {
                    return Err(());
                }
                options.unordered = true;
            }
            "-h" | "--help" => options.help = true,
            _ => return Err(()),
        }
    }

    Ok(options)
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("amredit=info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "amredit".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };
        if options.help {
            print_usage(&program);
            return Ok(());
        }

        init_logging();

        let base_url = options
            .server
            .or_else(|| std::env::var(SERVER_ENV).ok().filter(|url| !url.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_owned());
        let config = ClientConfig {
            base_url,
            timeout_secs: options.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };
        let view = ViewOptions {
            compare: options.compare,
            reverse_of: options.reverse_of,
            with_alignments: options.with_alignments,
        };
        let policy =
            if options.unordered { DispatchPolicy::Unordered } else { DispatchPolicy::LatestWins };

        let transport = HttpTransport::new(config)?;
        let client = SessionClient::new(transport).with_view(view).with_policy(policy);
        let mut controller = SessionController::new(client, TextRenderer::stdout());
        let start = options.start;

        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;

        runtime.block_on(async move {
            controller.bootstrap(start).await;
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            amredit::shell::run(&mut controller, stdin).await
        })?;

        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("amredit: {err}");
        std::process::exit(1);
    }
}
