//! CLI argument definitions using clap derive macros.

use clap::{Args as ClapArgs, Parser, Subcommand};

/// Default whole-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Command-line access to an Outline knowledge base.
///
/// Results are printed as JSON on stdout.
#[derive(Parser, Debug)]
#[command(name = "outcli")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Outline server URL, e.g. https://docs.example.com
    #[arg(short, long, global = true, env = "OUTLINE_SERVER")]
    pub server: Option<String>,

    /// API key used as bearer token
    #[arg(short, long, global = true, env = "OUTLINE_API_KEY", hide_env_values = true)]
    pub key: Option<String>,

    /// Whole-request timeout in seconds (1-600)
    #[arg(short, long, global = true, default_value_t = DEFAULT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=600))]
    pub timeout: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the version
    Version,

    /// Work with collections
    #[command(subcommand)]
    Collection(CollectionCommand),

    /// Work with documents
    #[command(subcommand)]
    Document(DocumentCommand),

    /// Work with attachments
    #[command(subcommand)]
    Attachment(AttachmentCommand),
}

/// Mutually exclusive permission flags shared by create and update.
#[derive(ClapArgs, Debug, Default, Clone, Copy)]
#[group(multiple = false)]
pub struct PermissionArgs {
    /// Workspace members may view
    #[arg(long)]
    pub permission_read: bool,

    /// Workspace members may view and edit
    #[arg(long)]
    pub permission_read_write: bool,
}

#[derive(Subcommand, Debug)]
pub enum CollectionCommand {
    /// Show one or more collections
    Info {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Create a collection
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
        /// Hex color, e.g. #AABBCC
        #[arg(long)]
        color: Option<String>,
        #[command(flatten)]
        permission: PermissionArgs,
        #[arg(long)]
        private: bool,
    },

    /// Show the document tree of one or more collections
    Docs {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// List all collections
    List {
        /// Page size (0 uses the server default)
        #[arg(short, long, default_value_t = 0)]
        limit: usize,
    },

    /// Update a collection
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[command(flatten)]
        permission: PermissionArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum DocumentCommand {
    /// Create a document
    Create {
        title: String,
        collection_id: String,
        /// Read the markdown body from stdin
        #[arg(long)]
        text_stdin: bool,
        #[arg(long)]
        publish: bool,
        /// Nest under this document
        #[arg(long)]
        parent: Option<String>,
    },

    /// Show a document
    Get {
        id: String,
        /// Treat ID as a share ID
        #[arg(long)]
        share: bool,
    },

    /// List documents
    List {
        /// Only documents in this collection
        #[arg(long)]
        collection: Option<String>,
        /// Only children of this document
        #[arg(long)]
        parent: Option<String>,
        /// Page size (0 uses the server default)
        #[arg(short, long, default_value_t = 0)]
        limit: usize,
    },

    /// Update a document
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        /// Read the markdown body from stdin
        #[arg(long)]
        text_stdin: bool,
        /// Append the text instead of replacing the body
        #[arg(long, requires = "text_stdin")]
        append: bool,
        #[arg(long)]
        publish: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum AttachmentCommand {
    /// Reserve an attachment and print its upload descriptor
    Create {
        name: String,
        content_type: String,
        size: u64,
        /// Associate with this document
        #[arg(long)]
        document: Option<String>,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_version_subcommand_parses() {
        let args = Args::try_parse_from(["outcli", "version"]).unwrap();
        assert!(matches!(args.command, Command::Version));
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        assert_eq!(args.timeout, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["outcli", "-v", "version"]).unwrap();
        assert_eq!(args.verbose, 1);

        let args = Args::try_parse_from(["outcli", "version", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_quiet_flag_sets_quiet() {
        let args = Args::try_parse_from(["outcli", "--quiet", "version"]).unwrap();
        assert!(args.quiet);
    }

    #[test]
    fn test_cli_server_and_key_flags() {
        let args = Args::try_parse_from([
            "outcli",
            "--server",
            "https://docs.example.com",
            "--key",
            "secret",
            "collection",
            "list",
        ])
        .unwrap();
        assert_eq!(args.server.as_deref(), Some("https://docs.example.com"));
        assert_eq!(args.key.as_deref(), Some("secret"));
        assert!(matches!(
            args.command,
            Command::Collection(CollectionCommand::List { limit: 0 })
        ));
    }

    #[test]
    fn test_cli_missing_subcommand_returns_error() {
        let result = Args::try_parse_from(["outcli"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let err = Args::try_parse_from(["outcli", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let err = Args::try_parse_from(["outcli", "--invalid-flag", "version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_cli_timeout_out_of_range_rejected() {
        assert!(Args::try_parse_from(["outcli", "-t", "0", "version"]).is_err());
        assert!(Args::try_parse_from(["outcli", "-t", "601", "version"]).is_err());
        let args = Args::try_parse_from(["outcli", "-t", "600", "version"]).unwrap();
        assert_eq!(args.timeout, 600);
    }

    #[test]
    fn test_cli_collection_info_requires_ids() {
        assert!(Args::try_parse_from(["outcli", "collection", "info"]).is_err());
        let args = Args::try_parse_from(["outcli", "collection", "info", "a", "b"]).unwrap();
        match args.command {
            Command::Collection(CollectionCommand::Info { ids }) => assert_eq!(ids, ["a", "b"]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_permission_flags_conflict() {
        let result = Args::try_parse_from([
            "outcli",
            "collection",
            "create",
            "Docs",
            "--permission-read",
            "--permission-read-write",
        ]);
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::ArgumentConflict
        );
    }

    #[test]
    fn test_cli_collection_create_options() {
        let args = Args::try_parse_from([
            "outcli",
            "collection",
            "create",
            "Docs",
            "--description",
            "All docs",
            "--permission-read",
            "--private",
        ])
        .unwrap();
        match args.command {
            Command::Collection(CollectionCommand::Create {
                name,
                description,
                permission,
                private,
                color,
            }) => {
                assert_eq!(name, "Docs");
                assert_eq!(description.as_deref(), Some("All docs"));
                assert!(permission.permission_read);
                assert!(!permission.permission_read_write);
                assert!(private);
                assert!(color.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_document_update_append_requires_text() {
        let err =
            Args::try_parse_from(["outcli", "document", "update", "d1", "--append"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);

        let args = Args::try_parse_from([
            "outcli",
            "document",
            "update",
            "d1",
            "--append",
            "--text-stdin",
        ])
        .unwrap();
        assert!(matches!(
            args.command,
            Command::Document(DocumentCommand::Update {
                append: true,
                text_stdin: true,
                ..
            })
        ));
    }

    #[test]
    fn test_cli_document_get_share_flag() {
        let args = Args::try_parse_from(["outcli", "document", "get", "s1", "--share"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Document(DocumentCommand::Get { share: true, .. })
        ));
    }

    #[test]
    fn test_cli_attachment_create_size_must_be_number() {
        assert!(
            Args::try_parse_from(["outcli", "attachment", "create", "a.png", "image/png", "big"])
                .is_err()
        );
        let args = Args::try_parse_from([
            "outcli",
            "attachment",
            "create",
            "a.png",
            "image/png",
            "42",
            "--document",
            "d1",
        ])
        .unwrap();
        assert!(matches!(
            args.command,
            Command::Attachment(AttachmentCommand::Create { size: 42, .. })
        ));
    }
}
