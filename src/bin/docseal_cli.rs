use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use log::{error, info};
use zeroize::Zeroizing;

use docseal::services::document_signer::artifact_file_name;
use docseal::services::fingerprint_engine::fingerprint;
use docseal::utils::container::SealedArtifact;
use docseal::{AuthorProfile, DocumentSigner, KeyManager, Settings, SignatureAssetStore, VerificationService};

#[derive(Parser, Debug)]
#[command(name = "docseal_cli", about = "Register signers, seal documents and check seals")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encrypt and store a signer's signature image
    RegisterAuthor {
        #[arg(long)]
        full_name: String,
        /// Identifier used for storage and output file names
        #[arg(long)]
        short_name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        mobile_phone: String,
        #[arg(long)]
        role: String,
        /// Path to the signature image
        #[arg(long)]
        signature: PathBuf,
    },
    /// Delete a signer's stored signature asset
    RemoveAuthor { author: String },
    /// List registered signers
    ListAuthors,
    /// Seal a document on behalf of a registered signer
    Sign {
        #[arg(long)]
        author: String,
        #[arg(long)]
        input: PathBuf,
        /// Output file name inside DOCSEAL_OUTPUT_DIR
        #[arg(long)]
        output: Option<String>,
    },
    /// Check the seal of an artifact
    Verify { file: PathBuf },
}

fn read_secret(var: &str, prompt: &str) -> io::Result<Zeroizing<String>> {
    if let Ok(value) = env::var(var) {
        return Ok(Zeroizing::new(value));
    }
    print!("{}: ", prompt);
    io::stdout().flush()?;
    let mut line = Zeroizing::new(String::new());
    io::stdin().lock().read_line(&mut line)?;
    Ok(Zeroizing::new(line.trim_end_matches(['\r', '\n']).to_string()))
}

fn default_output_name(input: &Path, author: &str) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let extension = input
        .extension()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "pdf".to_string());
    artifact_file_name(&stem, author, &extension)
}

async fn run(command: Command, settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::RegisterAuthor {
            full_name,
            short_name,
            email,
            mobile_phone,
            role,
            signature,
        } => {
            let profile = AuthorProfile::new(&full_name, &short_name, &email, &mobile_phone, &role);
            let image = Zeroizing::new(fs::read(&signature)?);
            let password = read_secret("DOCSEAL_ASSET_PASSWORD", "Password for the signature asset")?;

            SignatureAssetStore::new(&settings).register(&profile, &image, &password)?;
            println!("Registered {}", short_name);
        }
        Command::RemoveAuthor { author } => {
            if SignatureAssetStore::new(&settings).delete(&author)? {
                println!("Removed {}", author);
            } else {
                println!("No signature asset for {}", author);
            }
        }
        Command::ListAuthors => {
            for author in SignatureAssetStore::new(&settings).list()? {
                println!("{}", author);
            }
        }
        Command::Sign { author, input, output } => {
            let store = SignatureAssetStore::new(&settings);
            let profile = store.profile(&author)?;

            // Proves the signer knows the asset password before the key is unlocked.
            let password = read_secret("DOCSEAL_ASSET_PASSWORD", "Password for the signature asset")?;
            let asset = store.load(&author, &password)?;
            info!("Signature asset unlocked for {} ({} bytes)", author, asset.len());
            drop(asset);

            let document = fs::read(&input)?;
            let file_name = output.unwrap_or_else(|| default_output_name(&input, &profile.short_name));
            let passphrase = read_secret("DOCSEAL_KEY_PASSPHRASE", "Private key passphrase")?;

            let signer = Arc::new(DocumentSigner::new(&settings, Arc::new(KeyManager::new(&settings))));
            let published = signer
                .sign_and_publish_offloaded(document, passphrase, profile.metadata(), file_name)
                .await?;

            println!("Sealed {}", published.path.display());
            println!("Fingerprint: {}", published.document.fingerprint());
        }
        Command::Verify { file } => {
            let artifact = fs::read(&file)?;
            let service = VerificationService::from_settings(&settings)?;
            let result = service.verify(&artifact);

            println!("{}", serde_json::to_string_pretty(&result)?);

            // The seal only covers the declared fingerprint; show whether the
            // body still hashes to it.
            if let Some(seal) = &result.metadata {
                let actual = fingerprint(SealedArtifact::split(&artifact).content);
                if actual == seal.fingerprint {
                    println!("Content fingerprint matches the seal");
                } else {
                    println!("Note: content hashes to {}, which differs from the sealed fingerprint", actual);
                }
            }

            if !result.valid {
                std::process::exit(1);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    docseal::config::init_logging();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    let cli = Cli::parse();
    if let Err(e) = run(cli.command, settings).await {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
