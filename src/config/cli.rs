use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the postdesk binary.
#[derive(Debug, Parser)]
#[command(
    name = "postdesk",
    version,
    about = "Authoring console for the content site: media, categories and posts"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "POSTDESK_CONFIG_FILE",
        value_name = "PATH",
        global = true
    )]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: Overrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Browse and upload images in the media library.
    Media(MediaArgs),
    /// List and create categories.
    Categories(CategoriesArgs),
    /// List fate elements available to categories.
    Fates(FatesArgs),
    /// Compose and submit blog posts.
    Posts(PostsArgs),
}

#[derive(Debug, Args, Clone)]
pub struct MediaArgs {
    #[command(subcommand)]
    pub command: MediaCommand,
}

#[derive(Debug, Subcommand, Clone)]
pub enum MediaCommand {
    /// List every image under the configured namespace with its URL.
    List,
    /// Upload an image, then print the refreshed catalog.
    Upload {
        #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },
}

#[derive(Debug, Args, Clone)]
pub struct CategoriesArgs {
    #[command(subcommand)]
    pub command: CategoriesCommand,
}

#[derive(Debug, Subcommand, Clone)]
pub enum CategoriesCommand {
    /// Full category listing with descriptions and fates.
    List,
    /// The `{id, name}` options offered by the composer.
    Options,
    /// Create a category.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
        /// Fate id; repeat for several.
        #[arg(long = "fate-id", value_name = "ID", required = true)]
        fate_ids: Vec<String>,
    },
}

#[derive(Debug, Args, Clone)]
pub struct FatesArgs {
    #[command(subcommand)]
    pub command: FatesCommand,
}

#[derive(Debug, Subcommand, Clone)]
pub enum FatesCommand {
    /// List fate elements.
    List,
}

#[derive(Debug, Args, Clone)]
pub struct PostsArgs {
    #[command(subcommand)]
    pub command: PostsCommand,
}

#[derive(Debug, Subcommand, Clone)]
pub enum PostsCommand {
    /// Compose a post in the editor and submit it.
    Compose(ComposeArgs),
}

#[derive(Debug, Args, Clone, Default)]
pub struct ComposeArgs {
    #[arg(long)]
    pub title: String,

    /// Category id to file the post under.
    #[arg(long)]
    pub category: Option<String>,

    /// Body markup.
    #[arg(long, conflicts_with = "body_file")]
    pub body: Option<String>,

    /// Read body markup from a file.
    #[arg(long = "body-file", value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub body_file: Option<PathBuf>,

    /// Append an image by URL; repeat for several.
    #[arg(long = "image-url", value_name = "URL")]
    pub image_urls: Vec<String>,

    /// Append an image from the media catalog by file name.
    #[arg(long = "catalog-image", value_name = "NAME")]
    pub catalog_images: Vec<String>,

    /// Print the payload instead of sending it.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Debug, Args, Default, Clone)]
pub struct Overrides {
    /// Override the backend API base URL.
    #[arg(long = "api-base-url", value_name = "URL", global = true)]
    pub api_base_url: Option<String>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub log_json: Option<bool>,

    /// Override the storage backend (firebase|local).
    #[arg(long = "storage-backend", value_name = "BACKEND", global = true)]
    pub storage_backend: Option<String>,

    /// Override the Firebase bucket.
    #[arg(long = "storage-bucket", value_name = "BUCKET", global = true)]
    pub storage_bucket: Option<String>,

    /// Override the local storage directory.
    #[arg(long = "storage-directory", value_name = "PATH", global = true)]
    pub storage_directory: Option<PathBuf>,

    /// Override the media namespace.
    #[arg(long = "storage-namespace", value_name = "NAME", global = true)]
    pub storage_namespace: Option<String>,

    /// Override the editor surface (rich|stub).
    #[arg(long = "editor-surface", value_name = "SURFACE", global = true)]
    pub editor_surface: Option<String>,

    /// Author id sent with submitted posts.
    #[arg(long = "user-id", value_name = "ID", global = true)]
    pub user_id: Option<String>,

    /// Author name sent with submitted posts.
    #[arg(long = "user-name", value_name = "NAME", global = true)]
    pub user_name: Option<String>,
}
