use anyhow::Context;
use clap::Parser;
use frameserver::client::{ClientConfig, Session};
use frameserver::frame_catalog::{CsvFile, FrameSchema};
use rustyline::{error::ReadlineError, DefaultEditor};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long, default_value = "localhost")]
    host: String,

    #[arg(short, long, default_value_t = frameserver::client::DEFAULT_PORT)]
    port: u16,

    /// Show server-side error details
    #[arg(long)]
    show_details: bool,

    /// Log every API call
    #[arg(long)]
    log_api: bool,
}

#[derive(Debug, PartialEq)]
enum Command {
    Help,
    Frames,
    Names,
    Create {
        name: String,
        path: String,
        schema: FrameSchema,
        delimiter: char,
        skip: usize,
    },
    Rename {
        old: String,
        new: String,
    },
    Drop(Vec<String>),
    Take {
        name: String,
        count: usize,
    },
}

fn print_usage() {
    println!("Frameserver Client Commands:");
    println!("  :frames                                   - List frames with row counts");
    println!("  :names                                    - List frame names");
    println!("  :create <name> <path> <schema> [--delimiter c] [--skip n]");
    println!("                                            - Create a frame from a CSV file");
    println!("  :rename <old> <new>                       - Rename a frame");
    println!("  :drop <name>...                           - Drop frames");
    println!("  :take <name> [n]                          - Show the first n rows (default 10)");
    println!("  :help                                     - Show this help");
    println!();
    println!("Examples:");
    println!("  :create test_frame /datasets/data.csv a:str,b:int32 --skip 1");
    println!("  :rename test_frame test_frame_new_name");
}

fn parse_command(input: &str) -> Result<Command, String> {
    let mut parts = input.split_whitespace();
    let cmd = parts.next().unwrap_or_default();
    let args: Vec<&str> = parts.collect();

    match cmd {
        ":help" | ":h" => Ok(Command::Help),
        ":frames" | ":f" => Ok(Command::Frames),
        ":names" | ":n" => Ok(Command::Names),
        ":create" | ":c" => {
            if args.len() < 3 {
                return Err("Usage: :create <name> <path> <schema> [--delimiter c] [--skip n]".into());
            }
            let schema = args[2].parse::<FrameSchema>().map_err(|e| e.to_string())?;
            let mut delimiter = ',';
            let mut skip = 0;
            let mut options = args[3..].iter();
            while let Some(option) = options.next() {
                let value = options
                    .next()
                    .ok_or_else(|| format!("Missing value for {}", option))?;
                match *option {
                    "--delimiter" | "-d" => {
                        let mut chars = value.chars();
                        delimiter = match (chars.next(), chars.next()) {
                            (Some(c), None) => c,
                            _ => return Err(format!("Delimiter must be one character: {}", value)),
                        };
                    }
                    "--skip" | "-s" => {
                        skip = value
                            .parse()
                            .map_err(|_| format!("Invalid skip count: {}", value))?;
                    }
                    other => return Err(format!("Unknown option: {}", other)),
                }
            }
            Ok(Command::Create {
                name: args[0].to_string(),
                path: args[1].to_string(),
                schema,
                delimiter,
                skip,
            })
        }
        ":rename" | ":r" => match args.as_slice() {
            [old, new] => Ok(Command::Rename {
                old: old.to_string(),
                new: new.to_string(),
            }),
            _ => Err("Usage: :rename <old> <new>".into()),
        },
        ":drop" => {
            if args.is_empty() {
                return Err("Usage: :drop <name>...".into());
            }
            Ok(Command::Drop(args.iter().map(|s| s.to_string()).collect()))
        }
        ":take" | ":t" => match args.as_slice() {
            [name] => Ok(Command::Take {
                name: name.to_string(),
                count: 10,
            }),
            [name, count] => Ok(Command::Take {
                name: name.to_string(),
                count: count
                    .parse()
                    .map_err(|_| format!("Invalid row count: {}", count))?,
            }),
            _ => Err("Usage: :take <name> [n]".into()),
        },
        other => Err(format!(
            "Unknown command: {}. Type :help for available commands.",
            other
        )),
    }
}

async fn run_command(session: &Session, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Help => print_usage(),
        Command::Frames => {
            let frames = session.list_frames().await?;
            println!("\n=== Frames ===\n");
            for frame in frames {
                println!(
                    "  {} [id {}]: {} rows, {} columns",
                    frame.name.as_deref().unwrap_or("<unnamed>"),
                    frame.id,
                    frame.row_count,
                    frame.schema.len()
                );
            }
            println!();
        }
        Command::Names => {
            let mut names = session.get_frame_names().await?;
            names.sort();
            println!("\n{}\n", names.join("\n"));
        }
        Command::Create {
            name,
            path,
            schema,
            delimiter,
            skip,
        } => {
            let source = CsvFile::new(path, schema)
                .with_delimiter(delimiter)
                .with_skip_header_lines(skip);
            let frame = session.create_frame(source, Some(name.as_str())).await?;
            println!(
                "\nCreated frame {} with {} rows ({} rejected)\n",
                name,
                frame.row_count(),
                frame.rejected_rows()
            );
        }
        Command::Rename { old, new } => {
            let mut frame = session.get_frame(&old).await?;
            frame.set_name(&new).await?;
            println!("\nRenamed {} to {}\n", old, new);
        }
        Command::Drop(names) => {
            let names: Vec<&str> = names.iter().map(String::as_str).collect();
            let dropped = session.drop_frames(&names).await?;
            println!("\nDropped {} frame(s)\n", dropped);
        }
        Command::Take { name, count } => {
            let frame = session.get_frame(&name).await?;
            let rows = frame.take(count).await?;
            println!("\n{}", rows.columns.join(" | "));
            for row in rows.rows {
                let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
                println!("{}", cells.join(" | "));
            }
            println!();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let config = ClientConfig::default()
        .with_host(args.host)
        .with_port(args.port)
        .with_show_details(args.show_details)
        .with_api_logging(args.log_api);
    log::debug!("Connecting to {}", config.base_url());
    let session = Session::connect(config)
        .await
        .context("could not reach frame server")?;

    println!("\nConnected to frame server at {}.", session.base_url());
    println!("Type :help for commands.\n");

    let mut rl = DefaultEditor::new()?;

    loop {
        let readline = rl.readline("frameserver-client :) ");
        match readline {
            Ok(line) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                rl.add_history_entry(input)?;

                match parse_command(input) {
                    Ok(command) => {
                        if let Err(e) = run_command(&session, command).await {
                            log::debug!("Command `{}` failed: {:?}", input, e);
                            eprintln!("Error: {}", e);
                        }
                    }
                    Err(usage) => println!("{}", usage),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("\nBye");
                break;
            }
            Err(err) => {
                eprintln!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}
