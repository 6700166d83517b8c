use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{info, warn};

use engrave_label::consts::{DEFAULT_FAMILY, PREVIEW_MAX_H, PREVIEW_MAX_W};
use engrave_label::save::DEFAULT_FILE_NAME;
use engrave_label::{
    download_fallback, BlockTypesetter, FontBook, FontStyle, FontWeight, LabelContent, LabelJob, LabelSettings,
    OverwriteSlot, PickError, PlainText, RichText, SaveOutcome, SavePicker, Typesetter, Unit,
};

#[derive(Parser, Debug)]
#[command(name = "engrave-label", version, about = "Render auto-fitted text labels to 1-bit BMP for laser engraving")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a label and write it as BMP
    Render {
        #[command(flatten)]
        label: LabelArgs,
        #[arg(short, long, default_value = DEFAULT_FILE_NAME)]
        out: PathBuf,
    },
    /// Render a thumbnail PNG of a label
    Preview {
        #[command(flatten)]
        label: LabelArgs,
        #[arg(long, default_value_t = PREVIEW_MAX_W)]
        max_width: u32,
        #[arg(long, default_value_t = PREVIEW_MAX_H)]
        max_height: u32,
        #[arg(short, long, default_value = "preview.png")]
        out: PathBuf,
    },
    /// Read one label text per stdin line and keep overwriting the same BMP
    ///
    /// The label text comes from stdin, so `--text` and `--spans` are rejected.
    Session {
        #[command(flatten)]
        label: LabelArgs,
        /// Where to "download" when overwriting is not possible
        #[arg(long, default_value = ".")]
        download_dir: PathBuf,
    },
}

#[derive(Args, Debug)]
struct LabelArgs {
    /// Label text; `\n` starts a new line
    #[arg(short, long)]
    text: Option<String>,
    /// JSON array of text spans (rich-text mode)
    #[arg(long, conflicts_with = "text")]
    spans: Option<PathBuf>,
    /// JSON settings file (camelCase keys)
    #[arg(long)]
    settings: Option<PathBuf>,
    #[arg(long)]
    width: Option<f32>,
    #[arg(long)]
    height: Option<f32>,
    #[arg(long)]
    padding: Option<f32>,
    #[arg(long)]
    unit: Option<String>,
    #[arg(long)]
    mirror: bool,
    /// Fixed size in points, disables auto-size
    #[arg(long)]
    font_size: Option<f32>,
    /// Draw at the declared sizes (24pt plain, span sizes for rich text)
    #[arg(long)]
    no_auto_size: bool,
    #[arg(long)]
    max_font_size: Option<f32>,
    /// Regular TrueType face; without it glyphs are drawn as boxes
    #[arg(long)]
    font: Option<PathBuf>,
    #[arg(long)]
    font_bold: Option<PathBuf>,
    #[arg(long)]
    font_italic: Option<PathBuf>,
    /// Family name the faces are registered under
    #[arg(long, default_value = DEFAULT_FAMILY)]
    family: String,
}

impl LabelArgs {
    fn settings(&self) -> Result<LabelSettings> {
        let mut s = match &self.settings {
            Some(path) => LabelSettings::load(path).with_context(|| format!("reading {}", path.display()))?,
            None => LabelSettings::default(),
        };
        if let Some(v) = self.width {
            s.width = v;
        }
        if let Some(v) = self.height {
            s.height = v;
        }
        if let Some(v) = self.padding {
            s.padding = v;
        }
        if let Some(u) = &self.unit {
            s.unit = u.parse().unwrap_or(Unit::Pixel);
        }
        if self.mirror {
            s.is_flipped = true;
        }
        if let Some(pt) = self.font_size {
            s.font_size = Some(pt);
            s.auto_size = false;
        }
        if self.no_auto_size {
            s.auto_size = false;
        }
        if let Some(pt) = self.max_font_size {
            s.max_font_size = pt;
        }
        if self.spans.is_some() {
            s.rich_text = true;
        }
        Ok(s)
    }

    fn content(&self, settings: &LabelSettings) -> Result<LabelContent> {
        if let Some(path) = &self.spans {
            let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            return Ok(LabelContent::Rich(RichText::from_json(&raw)?));
        }
        let text = self.text.clone().unwrap_or_default().replace("\\n", "\n");
        if settings.rich_text {
            return Ok(LabelContent::Rich(RichText::from_json(&text)?));
        }
        Ok(LabelContent::Plain(PlainText::new(text)))
    }

    fn ensure_no_inline_text(&self) -> Result<()> {
        if self.text.is_some() || self.spans.is_some() {
            bail!("session reads label text from stdin; drop --text/--spans");
        }
        Ok(())
    }

    fn typesetter(&self) -> Result<Box<dyn Typesetter>> {
        let Some(regular) = &self.font else {
            warn!("no --font given, drawing glyph boxes");
            return Ok(Box::new(BlockTypesetter));
        };
        let mut book = FontBook::new();
        let faces = [
            (Some(regular), FontWeight::Normal, FontStyle::Normal),
            (self.font_bold.as_ref(), FontWeight::Bold, FontStyle::Normal),
            (self.font_italic.as_ref(), FontWeight::Normal, FontStyle::Italic),
        ];
        for (path, weight, style) in faces {
            if let Some(path) = path {
                book.add_face_file(&self.family, weight, style, path)
                    .with_context(|| format!("loading font {}", path.display()))?;
            }
        }
        Ok(Box::new(book))
    }
}

/// Asks on the terminal for a save path; an empty answer cancels.
struct TerminalPicker;

impl SavePicker for TerminalPicker {
    fn pick(&mut self, suggested_name: &str) -> std::result::Result<PathBuf, PickError> {
        eprint!("save BMP as [{suggested_name}] (\"-\" to cancel): ");
        io::stderr().flush().map_err(|e| PickError::Failed(e.to_string()))?;
        let mut answer = String::new();
        match io::stdin().read_line(&mut answer) {
            Ok(0) => Err(PickError::Cancelled),
            Ok(_) => match answer.trim() {
                "-" => Err(PickError::Cancelled),
                "" => Ok(PathBuf::from(suggested_name)),
                path => Ok(PathBuf::from(path)),
            },
            Err(e) => Err(PickError::Failed(e.to_string())),
        }
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Render { label, out } => {
            let settings = label.settings()?;
            let content = label.content(&settings)?;
            let typesetter = label.typesetter()?;
            let job = LabelJob::new(settings)?;
            let bmp = job.build_bmp(&content, typesetter.as_ref())?;
            write_file(&out, bmp.as_bytes())?;
            info!("wrote {} ({} bytes)", out.display(), bmp.len());
        }
        Command::Preview { label, max_width, max_height, out } => {
            let settings = label.settings()?;
            let content = label.content(&settings)?;
            let typesetter = label.typesetter()?;
            let job = LabelJob::new(settings)?;
            let rendered = job.render(&content, typesetter.as_ref());
            let thumb = rendered.thumbnail(max_width, max_height);
            if thumb.is_empty() {
                bail!("label has no area to preview");
            }
            thumb.save_png(&out).with_context(|| format!("writing {}", out.display()))?;
            info!("wrote preview {}", out.display());
        }
        Command::Session { label, download_dir } => {
            label.ensure_no_inline_text()?;
            let settings = label.settings()?;
            let typesetter = label.typesetter()?;
            let job = LabelJob::new(settings)?;
            let mut slot = OverwriteSlot::new();
            let mut picker = TerminalPicker;

            loop {
                let mut line = String::new();
                if io::stdin().read_line(&mut line)? == 0 {
                    break;
                }
                let text = line.trim_end_matches(['\r', '\n']).replace("\\n", "\n");
                let content = if job.settings().rich_text {
                    LabelContent::Rich(RichText::from_json(&text)?)
                } else {
                    LabelContent::Plain(PlainText::new(text))
                };
                let bmp = job.build_bmp(&content, typesetter.as_ref())?;
                match slot.save(&bmp, Some(&mut picker), DEFAULT_FILE_NAME) {
                    SaveOutcome::Saved(path) => eprintln!("saved {}", path.display()),
                    SaveOutcome::Cancelled => eprintln!("save cancelled"),
                    SaveOutcome::Fallback => {
                        let path = download_fallback(&bmp, &download_dir, DEFAULT_FILE_NAME)?;
                        eprintln!("overwrite unavailable, downloaded to {}", path.display());
                    }
                }
            }
        }
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("ERROR: {e:#}");
        std::process::exit(1);
    }
}
