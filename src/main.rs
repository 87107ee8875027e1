use std::env;
use std::fs;
use std::path::Path;
use std::process;

use chordbook::{BookOptions, FsSource};

fn usage() -> ! {
    eprintln!("Usage: chordbook [--keep-order] [--options <opts.yaml>] <book.txt> [setlist.md]");
    eprintln!("       chordbook [--options <opts.yaml>] --setlist <setlist.md>");
    eprintln!("       chordbook [--options <opts.yaml>] --song <song.cho>");
    process::exit(1);
}

enum Mode {
    Book,
    Setlist,
    Song,
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();

    let mut keep_order = false;
    let mut options_path: Option<String> = None;
    let mut mode = Mode::Book;
    let mut inputs: Vec<&String> = Vec::new();

    // Parse flags
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--keep-order" => keep_order = true,
            "--options" => match iter.next() {
                Some(path) => options_path = Some(path.clone()),
                None => usage(),
            },
            "--setlist" => mode = Mode::Setlist,
            "--song" => mode = Mode::Song,
            _ => inputs.push(arg),
        }
    }
    if inputs.is_empty() {
        usage();
    }

    let mut options = match &options_path {
        Some(path) => {
            let content = match fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) => {
                    eprintln!("Error reading options '{}': {}", path, e);
                    process::exit(1);
                }
            };
            match BookOptions::from_yaml(&content) {
                Ok(options) => options,
                Err(e) => {
                    eprintln!("{}", e);
                    process::exit(1);
                }
            }
        }
        None => BookOptions::default(),
    };
    options.keep_order |= keep_order;

    let source = FsSource;
    let input = Path::new(inputs[0]);

    let yaml = match mode {
        Mode::Song => chordbook::convert_song(input, &source, &options)
            .map(|song| serde_yaml::to_string(&song)),
        Mode::Setlist => chordbook::convert_setlist(input, &source, options)
            .map(|book| serde_yaml::to_string(&book)),
        Mode::Book => {
            let setlist = inputs.get(1).map(Path::new);
            chordbook::convert_book(input, setlist, &source, options)
                .map(|book| serde_yaml::to_string(&book))
        }
    };

    match yaml {
        Ok(Ok(yaml)) => println!("{}", yaml),
        Ok(Err(e)) => {
            eprintln!("Error writing YAML: {}", e);
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Conversion error: {}", e);
            process::exit(1);
        }
    }
}
