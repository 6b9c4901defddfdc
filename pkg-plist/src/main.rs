use clap::Parser;
use pkg_plist::cli::Cli;
use pkg_plist::parse_plist_file;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let plist = parse_plist_file(&cli.plist, cli.keyword_dir.as_deref())?;
    let paths: Vec<&str> = plist.entries.iter().map(|e| e.path()).collect();
    println!("{}", serde_json::to_string_pretty(&paths)?);
    Ok(())
}
