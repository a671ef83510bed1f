use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use solor_core::config::{
    chunk_size_from_env_value, content_namespace_from_env_value,
    credential_params_from_env_values, digest_algorithm_from_env_value,
};
use solor_core::{CodecConfig, CodecService};
use solor_identifiers::sctid::{self, PartitionType};
use solor_identifiers::{verhoeff, SctId, SolorId};
use solor_uuid::ContentSeed;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "solor")]
#[command(about = "SOLOR identifier and integrity codec CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Checksum a file
    Checksum {
        /// File to digest
        file: PathBuf,
        /// MD5, SHA-1 or SHA-256 (defaults to SOLOR_DIGEST_ALGORITHM, then SHA-1)
        #[arg(long)]
        algorithm: Option<String>,
        /// Published checksum, or a `<hex>  <name>` line, to verify against
        #[arg(long)]
        expect: Option<String>,
    },
    /// Type 5 UUID for a name
    Uuid {
        name: String,
        /// Namespace UUID (optional)
        #[arg(long)]
        namespace: Option<Uuid>,
    },
    /// Content UUID for a JSON content seed read from a file or stdin
    ContentUuid {
        /// JSON file (reads stdin when omitted)
        file: Option<PathBuf>,
        /// Also print the SOLOR ID of the UUID
        #[arg(long)]
        solor_id: bool,
    },
    /// Legacy Type 3 UUID for an SCTID
    SnomedUuid { sctid: String },
    /// SNOMED CT identifiers
    Sctid {
        #[command(subcommand)]
        command: SctidCommand,
    },
    /// SOLOR IDs
    SolorId {
        #[command(subcommand)]
        command: SolorIdCommand,
    },
    /// Verhoeff check digits
    Verhoeff {
        #[command(subcommand)]
        command: VerhoeffCommand,
    },
    /// Password hashing
    Password {
        #[command(subcommand)]
        command: PasswordCommand,
    },
    /// Encrypt text under the password from SOLOR_PASSWORD or stdin
    Encrypt { plaintext: String },
    /// Decrypt text produced by `encrypt`
    Decrypt { encoded: String },
}

#[derive(Subcommand)]
enum SctidCommand {
    /// Check an SCTID
    Validate { sctid: String },
    /// Print the parts of an SCTID as JSON
    Parse { sctid: String },
    /// Generate a long-form SCTID
    Generate {
        item_id: u64,
        /// Seven-digit namespace
        namespace: String,
        #[arg(long, value_enum, default_value_t = Component::Concept)]
        component: Component,
    },
}

#[derive(Subcommand)]
enum SolorIdCommand {
    /// SOLOR ID of a UUID
    Uuid { uuid: Uuid },
    /// SOLOR ID of an RxNorm RXCUI
    Rxnorm { rxcui: String },
    /// SOLOR ID of a LOINC number such as 8867-4
    Loinc { loinc: String },
    /// Check a SOLOR ID and report its source
    Verify { id: String },
}

#[derive(Subcommand)]
enum VerhoeffCommand {
    /// Print the check digit for a digit string
    Compute { digits: String },
    /// Check a digit string ending in its check digit
    Verify { digits: String },
}

#[derive(Subcommand)]
enum PasswordCommand {
    /// Create a salted credential record for the password from SOLOR_PASSWORD or stdin
    Hash,
    /// Check the password from SOLOR_PASSWORD or stdin against a credential record
    Check { stored: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Component {
    Concept,
    Description,
    Relationship,
    Subset,
    CrossMapSet,
    CrossMapTarget,
}

impl Component {
    fn long_partition(self) -> PartitionType {
        match self {
            Component::Concept => PartitionType::CONCEPT_LONG,
            Component::Description => PartitionType::DESCRIPTION_LONG,
            Component::Relationship => PartitionType::RELATIONSHIP_LONG,
            Component::Subset => PartitionType::SUBSET_LONG,
            Component::CrossMapSet => PartitionType::CROSS_MAP_SET_LONG,
            Component::CrossMapTarget => PartitionType::CROSS_MAP_TARGET_LONG,
        }
    }
}

/// Resolves codec configuration from the process environment.
///
/// # Environment Variables
/// - `SOLOR_DIGEST_ALGORITHM`: default checksum algorithm (default: SHA-1)
/// - `SOLOR_CHUNK_SIZE`: streaming read size in bytes (default: 8192)
/// - `SOLOR_PBKDF2_ITERATIONS`: key derivation iterations (default: 10240)
/// - `SOLOR_KEY_BITS`: derived key length (default: 256)
/// - `SOLOR_CONTENT_NAMESPACE`: namespace UUID for content seeds (default: none)
///
/// `SOLOR_PASSWORD` is read separately, and only by the password and encryption commands.
fn config_from_env() -> anyhow::Result<CodecConfig> {
    let config = CodecConfig::new(
        digest_algorithm_from_env_value(std::env::var("SOLOR_DIGEST_ALGORITHM").ok())?,
        chunk_size_from_env_value(std::env::var("SOLOR_CHUNK_SIZE").ok())?,
        credential_params_from_env_values(
            std::env::var("SOLOR_PBKDF2_ITERATIONS").ok(),
            std::env::var("SOLOR_KEY_BITS").ok(),
        )?,
        content_namespace_from_env_value(std::env::var("SOLOR_CONTENT_NAMESPACE").ok())?,
    )?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("solor=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let service = CodecService::new(config_from_env()?);

    match cli.command {
        Some(command) => run(command, &service),
        None => {
            println!("Use 'solor --help' for commands");
            Ok(())
        }
    }
}

fn run(command: Commands, service: &CodecService) -> anyhow::Result<()> {
    match command {
        Commands::Checksum {
            file,
            algorithm,
            expect,
        } => checksum(service, &file, algorithm, expect),
        Commands::Uuid { name, namespace } => {
            println!("{}", solor_uuid::type_five(namespace.as_ref(), &name));
            Ok(())
        }
        Commands::ContentUuid { file, solor_id } => {
            let json = match &file {
                Some(path) => std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?,
                None => std::io::read_to_string(std::io::stdin())
                    .context("failed to read content seed from stdin")?,
            };
            let seed: ContentSeed =
                serde_json::from_str(&json).context("failed to parse content seed")?;
            println!("{}", service.content_uuid(&seed)?);
            if solor_id {
                println!("{}", service.content_solor_id(&seed)?);
            }
            Ok(())
        }
        Commands::SnomedUuid { sctid } => {
            println!("{}", sctid::snomed_uuid(&sctid)?);
            Ok(())
        }
        Commands::Sctid { command } => run_sctid(command),
        Commands::SolorId { command } => run_solor_id(command),
        Commands::Verhoeff { command } => match command {
            VerhoeffCommand::Compute { digits } => {
                println!("{}", verhoeff::compute_check_digit(&digits)?);
                Ok(())
            }
            VerhoeffCommand::Verify { digits } => {
                if !verhoeff::verify(&digits) {
                    bail!("{} does not end in a valid check digit", digits);
                }
                println!("{} is valid", digits);
                Ok(())
            }
        },
        Commands::Password { command } => match command {
            PasswordCommand::Hash => {
                let password = password_from_env_or_stdin()?;
                println!("{}", service.salted_hash(&password)?);
                Ok(())
            }
            PasswordCommand::Check { stored } => {
                let password = password_from_env_or_stdin()?;
                if !service.check_password(&password, &stored) {
                    bail!("password does not match");
                }
                println!("password matches");
                Ok(())
            }
        },
        Commands::Encrypt { plaintext } => {
            let password = password_from_env_or_stdin()?;
            println!("{}", service.encrypt(&password, plaintext.as_bytes())?);
            Ok(())
        }
        Commands::Decrypt { encoded } => {
            let password = password_from_env_or_stdin()?;
            let plaintext = service.decrypt(&password, &encoded)?;
            println!(
                "{}",
                String::from_utf8(plaintext).context("decrypted data is not UTF-8")?
            );
            Ok(())
        }
    }
}

/// Reads the password from `SOLOR_PASSWORD`, else from the first line of stdin.
fn password_from_env_or_stdin() -> anyhow::Result<String> {
    read_password(std::env::var("SOLOR_PASSWORD").ok(), std::io::stdin().lock())
}

/// Uses `env_value` when set and non-empty, otherwise the first line of `input`.
fn read_password(env_value: Option<String>, mut input: impl BufRead) -> anyhow::Result<String> {
    if let Some(password) = env_value.filter(|v| !v.is_empty()) {
        return Ok(password);
    }
    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("failed to read password from stdin")?;
    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        bail!("no password: set SOLOR_PASSWORD or pipe it on stdin");
    }
    Ok(password.to_owned())
}

fn checksum(
    service: &CodecService,
    file: &Path,
    algorithm: Option<String>,
    expect: Option<String>,
) -> anyhow::Result<()> {
    let owned;
    let service = match algorithm {
        Some(name) => {
            let config = service.config();
            owned = CodecService::new(CodecConfig::new(
                digest_algorithm_from_env_value(Some(name))?,
                config.chunk_size(),
                config.credential_params(),
                config.content_namespace().copied(),
            )?);
            &owned
        }
        None => service,
    };

    let mut progress = |processed: u64, total: Option<u64>| {
        tracing::debug!(processed, ?total, "checksum progress");
    };
    let digest = service.digest_file(file, &mut progress)?;
    println!("{}  {}", digest, file.display());

    if let Some(expect) = expect {
        let Some(expected) = solor_digest::parse_checksum_line(&expect) else {
            bail!("'{}' is not a hex checksum", expect);
        };
        if !digest.matches_hex(&expected) {
            bail!(
                "{} checksum mismatch for {}: expected {}, got {}",
                digest.algorithm(),
                file.display(),
                expected,
                digest
            );
        }
        tracing::info!(file = %file.display(), algorithm = %digest.algorithm(), "checksum verified");
    }
    Ok(())
}

fn run_sctid(command: SctidCommand) -> anyhow::Result<()> {
    match command {
        SctidCommand::Validate { sctid } => {
            if !sctid::is_valid(&sctid) {
                bail!("{} is not a valid SCTID", sctid);
            }
            println!("{} is valid", sctid);
        }
        SctidCommand::Parse { sctid } => {
            let parsed = SctId::parse(&sctid)?;
            println!("{}", serde_json::to_string_pretty(&parsed)?);
        }
        SctidCommand::Generate {
            item_id,
            namespace,
            component,
        } => {
            println!(
                "{}",
                sctid::generate(item_id, &namespace, component.long_partition())?
            );
        }
    }
    Ok(())
}

fn run_solor_id(command: SolorIdCommand) -> anyhow::Result<()> {
    let id = match command {
        SolorIdCommand::Uuid { uuid } => SolorId::from_uuid(&uuid)?,
        SolorIdCommand::Rxnorm { rxcui } => SolorId::from_rxnorm_id(&rxcui)?,
        SolorIdCommand::Loinc { loinc } => SolorId::from_loinc_id(&loinc)?,
        SolorIdCommand::Verify { id } => {
            let parsed = SolorId::parse(&id)?;
            println!("{} is valid ({:?})", parsed, parsed.source());
            return Ok(());
        }
    };
    println!("{}", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_sctid_generate() {
        let cli = Cli::try_parse_from([
            "solor",
            "sctid",
            "generate",
            "700000",
            "1000124",
            "--component",
            "cross-map-set",
        ])
        .unwrap();
        let Some(Commands::Sctid {
            command:
                SctidCommand::Generate {
                    item_id,
                    namespace,
                    component,
                },
        }) = cli.command
        else {
            panic!("expected sctid generate");
        };
        assert_eq!(item_id, 700000);
        assert_eq!(namespace, "1000124");
        assert_eq!(component, Component::CrossMapSet);
    }

    #[test]
    fn test_components_map_to_long_partitions() {
        for component in Component::value_variants() {
            assert!(component.long_partition().is_long_form());
        }
        assert_eq!(Component::Concept.long_partition().digits(), "10");
    }

    #[test]
    fn test_password_prefers_environment() {
        let password = read_password(Some("from-env".into()), "from-stdin\n".as_bytes()).unwrap();
        assert_eq!(password, "from-env");
    }

    #[test]
    fn test_password_falls_back_to_first_stdin_line() {
        let password = read_password(None, "s3cret pass\r\nignored\n".as_bytes()).unwrap();
        assert_eq!(password, "s3cret pass");
        let password = read_password(Some(String::new()), "piped".as_bytes()).unwrap();
        assert_eq!(password, "piped");
    }

    #[test]
    fn test_password_missing_is_an_error() {
        assert!(read_password(None, "".as_bytes()).is_err());
        assert!(read_password(None, "\n".as_bytes()).is_err());
    }

    #[test]
    fn test_cli_rejects_password_arguments() {
        assert!(Cli::try_parse_from(["solor", "encrypt", "hunter2", "secret"]).is_err());
        assert!(Cli::try_parse_from(["solor", "password", "hash", "hunter2"]).is_err());
        assert!(Cli::try_parse_from(["solor", "password", "check", "record"]).is_ok());
    }

    #[test]
    fn test_cli_rejects_bad_uuid() {
        assert!(Cli::try_parse_from(["solor", "solor-id", "uuid", "nope"]).is_err());
    }

    #[test]
    fn test_checksum_verifies_expected_line() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let file = temp_dir.path().join("abc.txt");
        std::fs::write(&file, b"abc").unwrap();
        let service = CodecService::default();

        assert!(checksum(
            &service,
            &file,
            None,
            Some("a9993e364706816aba3e25717850c26c9cd0d89d  abc.txt".into())
        )
        .is_ok());
        assert!(checksum(
            &service,
            &file,
            Some("md5".into()),
            Some("a9993e364706816aba3e25717850c26c9cd0d89d".into())
        )
        .is_err());
        assert!(checksum(&service, &file, Some("crc32".into()), None).is_err());
    }
}
