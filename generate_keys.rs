use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use dotenv::dotenv;
use log::error;
use zeroize::Zeroizing;

use docseal::{KeyManager, Settings};

/// Generate the RSA keypair used to seal documents.
#[derive(Parser, Debug)]
#[command(name = "generate_keys")]
struct Args {
    /// Where to write the public key (defaults to DOCSEAL_PUBLIC_KEY)
    #[arg(long)]
    public_key: Option<PathBuf>,

    /// Where to write the encrypted private key (defaults to DOCSEAL_PRIVATE_KEY)
    #[arg(long)]
    private_key: Option<PathBuf>,

    /// Replace an existing private key
    #[arg(long)]
    force: bool,
}

fn read_passphrase() -> io::Result<Zeroizing<String>> {
    if let Ok(passphrase) = env::var("DOCSEAL_KEY_PASSPHRASE") {
        return Ok(Zeroizing::new(passphrase));
    }
    print!("Enter a passphrase to secure your private key: ");
    io::stdout().flush()?;
    let mut line = Zeroizing::new(String::new());
    io::stdin().lock().read_line(&mut line)?;
    Ok(Zeroizing::new(line.trim_end_matches(['\r', '\n']).to_string()))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    docseal::config::init_logging();

    let args = Args::parse();
    let mut settings = Settings::from_env()?;
    if let Some(path) = args.public_key {
        settings.public_key_path = path;
    }
    if let Some(path) = args.private_key {
        settings.private_key_path = path;
    }

    let passphrase = read_passphrase()?;
    let key_manager = KeyManager::new(&settings);

    let pair = KeyManager::generate(&passphrase)?;
    if let Err(e) = key_manager.save(&pair, args.force) {
        error!("{} (use --force to replace the existing key)", e);
        return Err(e.into());
    }

    println!("Public key:  {}", key_manager.public_key_path().display());
    println!("Private key: {}", key_manager.private_key_path().display());
    Ok(())
}
