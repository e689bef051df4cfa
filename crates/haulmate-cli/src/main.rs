//! Thin CLI over the Haulmate core.
//!
//! Every subcommand builds an `AppContext` and forwards to a repository;
//! there is no logic here beyond argument parsing and printing.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use haulmate_core::chat::ChatConfig;
use haulmate_core::repos::{EmergencyContact, GalleryPhoto, Trailer};
use haulmate_core::AppContext;

#[derive(Parser)]
#[command(name = "haulmate", about = "Companion toolbox for truck drivers")]
struct Cli {
    /// Data directory (defaults to ~/.config/haulmate)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show or edit the truck profile
    Truck {
        #[command(subcommand)]
        action: TruckAction,
    },
    /// Manage the trailer registry
    Trailer {
        #[command(subcommand)]
        action: TrailerAction,
    },
    /// Manage emergency contacts
    Contact {
        #[command(subcommand)]
        action: ContactAction,
    },
    /// Manage gallery photos
    Gallery {
        #[command(subcommand)]
        action: GalleryAction,
    },
    /// Ask the AI assistant one question (needs HAULMATE_API_KEY)
    Chat { message: String },
    /// Print the news feed
    News,
}

#[derive(Subcommand)]
enum TruckAction {
    /// Print the profile as JSON
    Show,
    /// Update profile fields
    Set {
        #[arg(long)]
        truck_number: Option<String>,
        #[arg(long)]
        make: Option<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        year: Option<String>,
        #[arg(long)]
        license_plate: Option<String>,
        #[arg(long)]
        vin: Option<String>,
        /// Path to a truck photo to import
        #[arg(long)]
        photo: Option<String>,
    },
}

#[derive(Subcommand)]
enum TrailerAction {
    List,
    Add {
        name: String,
        #[arg(long)]
        trailer_type: Option<String>,
        #[arg(long)]
        license_plate: Option<String>,
        /// Path to a trailer photo to import
        #[arg(long)]
        photo: Option<String>,
    },
    Remove {
        id: String,
    },
}

#[derive(Subcommand)]
enum ContactAction {
    List,
    Add {
        name: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        relation: Option<String>,
    },
    Remove {
        id: String,
    },
}

#[derive(Subcommand)]
enum GalleryAction {
    List,
    /// Import a photo into the gallery
    Add {
        path: String,
        #[arg(long)]
        caption: Option<String>,
    },
    Remove {
        id: String,
    },
}

fn main() -> ExitCode {
    env_logger::init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let mut builder = AppContext::builder();
    if let Some(dir) = cli.data_dir {
        builder = builder.data_dir(dir);
    }
    if let Ok(api_key) = std::env::var("HAULMATE_API_KEY") {
        builder = builder.chat_config(ChatConfig::new(
            "https://api.openai.com/v1/chat/completions",
            api_key,
        ));
    }
    let ctx = builder.build()?;
    log::debug!("data dir: {}", ctx.data_dir().display());

    match cli.command {
        Command::Truck { action } => truck(&ctx, action),
        Command::Trailer { action } => trailer(&ctx, action),
        Command::Contact { action } => contact(&ctx, action),
        Command::Gallery { action } => gallery(&ctx, action),
        Command::Chat { message } => chat(&ctx, &message),
        Command::News => news(&ctx),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

fn truck(ctx: &AppContext, action: TruckAction) -> Result<(), String> {
    match action {
        TruckAction::Show => print_json(&ctx.truck.get()),
        TruckAction::Set {
            truck_number,
            make,
            model,
            year,
            license_plate,
            vin,
            photo,
        } => {
            let mut profile = ctx.truck.get();
            if let Some(value) = truck_number {
                profile.truck_number = value;
            }
            if let Some(value) = make {
                profile.make = value;
            }
            if let Some(value) = model {
                profile.model = value;
            }
            if let Some(value) = year {
                profile.year = value;
            }
            if let Some(value) = license_plate {
                profile.license_plate = value;
            }
            if let Some(value) = vin {
                profile.vin = value;
            }
            if let Some(value) = photo {
                profile.photo_uri = value;
            }

            let saved = ctx.truck.save(profile).map_err(|e| e.to_string())?;
            print_json(&saved)
        }
    }
}

fn trailer(ctx: &AppContext, action: TrailerAction) -> Result<(), String> {
    match action {
        TrailerAction::List => print_json(&ctx.trailers.list()),
        TrailerAction::Add {
            name,
            trailer_type,
            license_plate,
            photo,
        } => {
            let mut draft = Trailer::draft(name);
            draft.trailer_type = trailer_type.unwrap_or_default();
            draft.license_plate = license_plate.unwrap_or_default();
            draft.photo_uri = photo.unwrap_or_default();

            let created = ctx.trailers.create(draft).map_err(|e| e.to_string())?;
            print_json(&created)
        }
        TrailerAction::Remove { id } => {
            ctx.trailers.delete(&id).map_err(|e| e.to_string())?;
            println!("removed {id}");
            Ok(())
        }
    }
}

fn contact(ctx: &AppContext, action: ContactAction) -> Result<(), String> {
    match action {
        ContactAction::List => print_json(&ctx.contacts.list()),
        ContactAction::Add {
            name,
            phone,
            relation,
        } => {
            let mut draft = EmergencyContact::draft(name);
            draft.phone = phone.unwrap_or_default();
            draft.relation = relation.unwrap_or_default();

            let created = ctx.contacts.create(draft).map_err(|e| e.to_string())?;
            print_json(&created)
        }
        ContactAction::Remove { id } => {
            ctx.contacts.delete(&id).map_err(|e| e.to_string())?;
            println!("removed {id}");
            Ok(())
        }
    }
}

fn gallery(ctx: &AppContext, action: GalleryAction) -> Result<(), String> {
    match action {
        GalleryAction::List => print_json(&ctx.gallery.list()),
        GalleryAction::Add { path, caption } => {
            let mut draft = GalleryPhoto::draft(path);
            draft.caption = caption.unwrap_or_default();

            let created = ctx.gallery.create(draft).map_err(|e| e.to_string())?;
            print_json(&created)
        }
        GalleryAction::Remove { id } => {
            ctx.gallery.delete(&id).map_err(|e| e.to_string())?;
            println!("removed {id}");
            Ok(())
        }
    }
}

fn chat(ctx: &AppContext, message: &str) -> Result<(), String> {
    let reply = ctx.chat.send(message).map_err(|e| e.to_string())?;
    println!("{}", reply.content);
    Ok(())
}

fn news(ctx: &AppContext) -> Result<(), String> {
    let payload = ctx.news.latest().map_err(|e| e.to_string())?;
    print_json(&payload)
}
