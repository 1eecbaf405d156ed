use anyhow::Result;
use bitstore::areas::repository::Repository;
use bitstore::artifacts::objects::object_type::ObjectType;
use bitstore::commands::plumbing::hash_object::hash_file;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "bitstore",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "A content-addressed git object store",
    long_about = "Reads and writes git's loose objects and references. \
    Set BIT_LOG (e.g. BIT_LOG=debug) to see what the store is doing on stderr.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command initializes a new repository in the current directory or at the specified path. \
        The directory must be empty or not exist yet."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<PathBuf>,
    },
    #[command(
        name = "hash-object",
        about = "Hash an object and optionally write it to the object database"
    )]
    HashObject {
        #[arg(short = 't', long = "type", default_value = "blob", help = "The object type")]
        kind: ObjectType,
        #[arg(short, long, help = "Write the object to the object database")]
        write: bool,
        #[arg(index = 1)]
        file: PathBuf,
    },
    #[command(
        name = "cat-file",
        about = "Print the content of an object",
        long_about = "This command prints the raw payload of an object. Tags and commits \
        are followed until an object of the requested type is reached."
    )]
    CatFile {
        #[arg(index = 1, help = "The expected object type")]
        kind: ObjectType,
        #[arg(index = 2, help = "The object to print")]
        object: String,
    },
    #[command(name = "ls-tree", about = "List the contents of a tree object")]
    LsTree {
        #[arg(short, long, help = "Recurse into subtrees")]
        recursive: bool,
        #[arg(index = 1, help = "A tree-ish object")]
        object: String,
    },
    #[command(
        name = "log",
        about = "Print the commit graph as a graphviz digraph"
    )]
    Log {
        #[arg(index = 1, default_value = "HEAD", help = "Commit to start at")]
        commit: String,
    },
    #[command(name = "show-ref", about = "List references")]
    ShowRef,
    #[command(
        name = "tag",
        about = "List and create tags",
        long_about = "Without a name, lists all tags. With a name, creates a lightweight tag, \
        or an annotated tag object with -a."
    )]
    Tag {
        #[arg(short = 'a', help = "Create an annotated tag object")]
        annotate: bool,
        #[arg(short, long, default_value = "", help = "Message of an annotated tag")]
        message: String,
        #[arg(index = 1, help = "The new tag's name")]
        name: Option<String>,
        #[arg(index = 2, default_value = "HEAD", help = "The object the new tag will point to")]
        object: String,
    },
    #[command(name = "rev-parse", about = "Resolve a revision to an object id")]
    RevParse {
        #[arg(long = "type", help = "Peel the object to this type")]
        kind: Option<ObjectType>,
        #[arg(index = 1)]
        name: String,
    },
    #[command(
        name = "checkout",
        about = "Check out a commit inside of an empty directory"
    )]
    Checkout {
        #[arg(index = 1, help = "The commit or tree to check out")]
        commit: String,
        #[arg(index = 2, help = "The empty directory to check out into")]
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("BIT_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let pwd = std::env::current_dir()?;
    let stdout = Box::new(std::io::stdout());

    match &cli.command {
        Commands::Init { path } => {
            Repository::init_at(path.as_deref().unwrap_or(&pwd), stdout)?;
            return Ok(());
        }
        Commands::HashObject {
            kind,
            write: false,
            file,
        } => {
            let oid = hash_file(file, *kind)?;
            writeln!(std::io::stdout(), "{oid}")?;
            return Ok(());
        }
        _ => {}
    }

    let repository = Repository::find(&pwd, stdout)?;
    match &cli.command {
        Commands::Init { .. } => {}
        Commands::HashObject { kind, write, file } => {
            repository.hash_object(file, *kind, *write)?
        }
        Commands::CatFile { kind, object } => repository.cat_file(*kind, object)?,
        Commands::LsTree { recursive, object } => repository.ls_tree(object, *recursive)?,
        Commands::Log { commit } => repository.log(commit)?,
        Commands::ShowRef => repository.show_ref()?,
        Commands::Tag {
            annotate,
            message,
            name,
            object,
        } => match name {
            Some(name) => repository.create_tag(name, object, *annotate, message)?,
            None => repository.list_tags()?,
        },
        Commands::RevParse { kind, name } => repository.rev_parse(name, *kind)?,
        Commands::Checkout { commit, path } => repository.checkout(commit, path)?,
    }

    repository.writer().flush()?;

    Ok(())
}
