use anyhow::{Context, bail};
use chrono::{NaiveDate, NaiveTime, Utc};
use clap::{Args, Subcommand};
use tracing::warn;

use cadence_api::ApiClient;
use cadence_api::auth::{sign_in_with_magic_link, sign_in_with_otp, sign_out};
use cadence_session::SessionStore;
use cadence_storage::KeyValueStore;
use cadence_types::api::{
    AlbumInput, ArtistInput, ChangePasswordRequest, MessageResponse, RegisterRequest, SongInput,
};
use cadence_types::catalog::{filter_by_genre, format_duration, partition_subscriptions, playback_source};
use cadence_types::models::{Album, Artist, Song, UserRecord};

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an account; a verification mail follows.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long, env = "CADENCE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Check the password and have a one-time code mailed.
    RequestOtp {
        username: String,
        #[arg(long, env = "CADENCE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Finish logging in with the mailed code.
    VerifyOtp { username: String, otp: String },
    /// Mail a magic login link.
    Recover { email: String },
    VerifyMagicLink { token: String },
    VerifyEmail { token: String },
    ForgotPassword { email: String },
    ResetPassword {
        token: String,
        #[arg(long, env = "CADENCE_NEW_PASSWORD", hide_env_values = true)]
        new_password: String,
    },
    ChangePassword {
        #[arg(long, env = "CADENCE_PASSWORD", hide_env_values = true)]
        old_password: String,
        #[arg(long, env = "CADENCE_NEW_PASSWORD", hide_env_values = true)]
        new_password: String,
    },
    /// Show who is logged in.
    Whoami,
    Logout,
    Artists {
        #[arg(long)]
        genre: Option<String>,
    },
    Albums {
        #[arg(long)]
        artist: Option<String>,
    },
    Songs {
        #[arg(long)]
        album: Option<String>,
    },
    Song { id: String },
    /// Print the URL a player should fetch for a song.
    StreamUrl { id: String },
    Rate { id: String, rating: u8 },
    Unrate { id: String },
    Recommendations,
    Subscriptions,
    SubscribeArtist { artist_id: String },
    UnsubscribeArtist { artist_id: String },
    SubscribeGenre { genre: String },
    UnsubscribeGenre { genre: String },
    Notifications,
    /// Catalog management; needs an ADMIN account.
    Admin {
        #[command(subcommand)]
        action: AdminCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    CreateArtist(ArtistArgs),
    UpdateArtist {
        id: String,
        #[command(flatten)]
        artist: ArtistArgs,
    },
    DeleteArtist { id: String },
    CreateAlbum(AlbumArgs),
    UpdateAlbum {
        id: String,
        #[command(flatten)]
        album: AlbumArgs,
    },
    DeleteAlbum { id: String },
    CreateSong(SongArgs),
    UpdateSong {
        id: String,
        #[command(flatten)]
        song: SongArgs,
    },
    DeleteSong { id: String },
}

#[derive(Debug, Args)]
pub struct ArtistArgs {
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "")]
    biography: String,
    /// Repeat for several genres.
    #[arg(long = "genre")]
    genres: Vec<String>,
}

impl From<ArtistArgs> for ArtistInput {
    fn from(args: ArtistArgs) -> Self {
        ArtistInput {
            name: args.name,
            biography: args.biography,
            genres: args.genres,
        }
    }
}

#[derive(Debug, Args)]
pub struct AlbumArgs {
    #[arg(long)]
    name: String,
    /// YYYY-MM-DD; today when omitted.
    #[arg(long)]
    release_date: Option<NaiveDate>,
    #[arg(long, default_value = "")]
    genre: String,
    #[arg(long = "artist")]
    artist_ids: Vec<String>,
}

impl From<AlbumArgs> for AlbumInput {
    fn from(args: AlbumArgs) -> Self {
        let release_date = match args.release_date {
            Some(date) => date.and_time(NaiveTime::MIN).and_utc(),
            None => Utc::now(),
        };
        AlbumInput {
            name: args.name,
            release_date,
            genre: args.genre,
            artist_ids: args.artist_ids,
        }
    }
}

#[derive(Debug, Args)]
pub struct SongArgs {
    #[arg(long)]
    name: String,
    /// Seconds.
    #[arg(long)]
    duration: u32,
    #[arg(long, default_value = "")]
    genre: String,
    #[arg(long)]
    album: String,
    #[arg(long = "artist")]
    artist_ids: Vec<String>,
    #[arg(long)]
    audio_url: Option<String>,
}

impl From<SongArgs> for SongInput {
    fn from(args: SongArgs) -> Self {
        SongInput {
            name: args.name,
            duration: args.duration,
            genre: args.genre,
            album_id: args.album,
            artist_ids: args.artist_ids,
            audio_file_url: args.audio_url.filter(|u| !u.is_empty()),
        }
    }
}

impl Command {
    fn needs_login(&self) -> bool {
        matches!(
            self,
            Command::ChangePassword { .. }
                | Command::Rate { .. }
                | Command::Unrate { .. }
                | Command::Recommendations
                | Command::Subscriptions
                | Command::SubscribeArtist { .. }
                | Command::UnsubscribeArtist { .. }
                | Command::SubscribeGenre { .. }
                | Command::UnsubscribeGenre { .. }
                | Command::Notifications
        )
    }

    fn needs_admin(&self) -> bool {
        matches!(self, Command::Admin { .. })
    }
}

pub async fn run<S: KeyValueStore>(
    command: Command,
    api: &ApiClient,
    session: &mut SessionStore<S>,
) -> anyhow::Result<()> {
    if command.needs_login() && !session.is_authenticated() {
        bail!("you must be logged in; run `cadence request-otp` then `cadence verify-otp`");
    }
    if command.needs_admin() && !session.is_admin() {
        bail!("catalog changes need an ADMIN account");
    }

    match command {
        Command::Register {
            username,
            email,
            first_name,
            last_name,
            password,
        } => {
            let req = RegisterRequest {
                first_name,
                last_name,
                email,
                username,
                confirm_password: password.clone(),
                password,
            };
            print_ack(api.register(&req).await?, "Registered. Check your email.");
        }
        Command::RequestOtp { username, password } => {
            print_ack(api.request_otp(&username, &password).await?, "Code sent.");
        }
        Command::VerifyOtp { username, otp } => {
            let user = sign_in_with_otp(api, session, &username, &otp).await?;
            println!("Logged in as {}", describe(&user));
        }
        Command::Recover { email } => {
            print_ack(api.request_magic_link(&email).await?, "Login link sent.");
        }
        Command::VerifyMagicLink { token } => {
            let user = sign_in_with_magic_link(api, session, &token).await?;
            println!("Logged in as {}", describe(&user));
        }
        Command::VerifyEmail { token } => {
            print_ack(api.verify_email(&token).await?, "Email verified.");
        }
        Command::ForgotPassword { email } => {
            print_ack(api.request_password_reset(&email).await?, "Reset link sent.");
        }
        Command::ResetPassword { token, new_password } => {
            print_ack(api.reset_password(&token, &new_password).await?, "Password reset.");
        }
        Command::ChangePassword {
            old_password,
            new_password,
        } => {
            let username = session
                .current_user()
                .map(|u| u.username)
                .context("session has no user")?;
            let req = ChangePasswordRequest {
                username,
                old_password,
                new_password,
            };
            print_ack(api.change_password(&req).await?, "Password changed.");
        }
        Command::Whoami => match session.current_user() {
            Some(user) => println!("{}", describe(&user)),
            None => println!("Not logged in"),
        },
        Command::Logout => {
            let was_logged_in = session.is_authenticated();
            sign_out(api, session).await;
            if was_logged_in {
                println!("Logged out");
            } else {
                println!("Not logged in");
            }
        }
        Command::Artists { genre } => {
            let artists = api.artists().await?;
            for artist in filter_by_genre(&artists, genre.as_deref()) {
                print_artist(artist);
            }
        }
        Command::Albums { artist } => {
            let albums = match artist {
                Some(artist_id) => api.albums_by_artist(&artist_id).await?,
                None => api.albums().await?,
            };
            for album in &albums {
                print_album(album);
            }
        }
        Command::Songs { album } => {
            let songs = match album {
                Some(album_id) => api.songs_by_album(&album_id).await?,
                None => api.songs().await?,
            };
            for song in &songs {
                print_song(song);
            }
        }
        Command::Song { id } => {
            let song = api.song(&id).await?;
            print_song(&song);
            if session.is_authenticated() && !session.is_admin() {
                match api.song_rating(&song.id).await {
                    Ok(Some(rating)) => println!("Your rating: {rating}/5"),
                    Ok(None) => println!("Not rated yet"),
                    Err(e) => warn!(error = %e, "Could not load rating"),
                }
            }
        }
        Command::StreamUrl { id } => {
            let song = api.song(&id).await?;
            println!("{}", playback_source(&song, &api.stream_url(&song.id))?);
        }
        Command::Rate { id, rating } => {
            api.rate_song(&id, rating).await?;
            println!("Rated {id}: {rating}");
        }
        Command::Unrate { id } => {
            api.delete_rating(&id).await?;
            println!("Rating removed");
        }
        Command::Recommendations => {
            let recs = api.recommendations().await?;
            if let Some(top) = &recs.top_rated_song {
                println!("Top rated: {} ({})", top.name, top.reason);
            }
            for rec in &recs.subscribed_genre_songs {
                println!("{}\t{}\t{}\t{}", rec.song_id, rec.name, rec.genre, format_duration(rec.duration));
            }
        }
        Command::Subscriptions => {
            let subs = api.subscriptions().await;
            let (artists, genres) = partition_subscriptions(&subs);
            for sub in artists {
                println!("artist\t{}", sub.artist_id.as_deref().unwrap_or("?"));
            }
            for sub in genres {
                println!("genre\t{}", sub.genre.as_deref().unwrap_or("?"));
            }
        }
        Command::SubscribeArtist { artist_id } => {
            api.subscribe_artist(&artist_id).await?;
            println!("Subscribed to artist {artist_id}");
        }
        Command::UnsubscribeArtist { artist_id } => {
            api.unsubscribe_artist(&artist_id).await?;
            println!("Unsubscribed from artist {artist_id}");
        }
        Command::SubscribeGenre { genre } => {
            api.subscribe_genre(&genre).await?;
            println!("Subscribed to {genre}");
        }
        Command::UnsubscribeGenre { genre } => {
            api.unsubscribe_genre(&genre).await?;
            println!("Unsubscribed from {genre}");
        }
        Command::Notifications => {
            for n in api.notifications().await? {
                let mark = if n.read { " " } else { "*" };
                println!("{mark} {}\t{}", n.kind, n.message);
            }
        }
        Command::Admin { action } => run_admin(action, api).await?,
    }
    Ok(())
}

async fn run_admin(action: AdminCommand, api: &ApiClient) -> anyhow::Result<()> {
    match action {
        AdminCommand::CreateArtist(args) => print_artist(&api.create_artist(&args.into()).await?),
        AdminCommand::UpdateArtist { id, artist } => {
            print_artist(&api.update_artist(&id, &artist.into()).await?)
        }
        AdminCommand::DeleteArtist { id } => {
            api.delete_artist(&id).await?;
            println!("Deleted artist {id}");
        }
        AdminCommand::CreateAlbum(args) => print_album(&api.create_album(&args.into()).await?),
        AdminCommand::UpdateAlbum { id, album } => {
            print_album(&api.update_album(&id, &album.into()).await?)
        }
        AdminCommand::DeleteAlbum { id } => {
            api.delete_album(&id).await?;
            println!("Deleted album {id}");
        }
        AdminCommand::CreateSong(args) => print_song(&api.create_song(&args.into()).await?),
        AdminCommand::UpdateSong { id, song } => print_song(&api.update_song(&id, &song.into()).await?),
        AdminCommand::DeleteSong { id } => {
            api.delete_song(&id).await?;
            println!("Deleted song {id}");
        }
    }
    Ok(())
}

fn print_ack(resp: MessageResponse, fallback: &str) {
    println!("{}", resp.message.as_deref().unwrap_or(fallback));
}

fn print_artist(artist: &Artist) {
    println!("{}\t{}\t{}", artist.id, artist.name, artist.genres.join(", "));
}

fn print_album(album: &Album) {
    println!("{}\t{}\t{}", album.id, album.name, album.genre);
}

fn print_song(song: &Song) {
    println!("{}\t{}\t{}\t{}", song.id, song.name, format_duration(song.duration), song.genre);
}

fn describe(user: &UserRecord) -> String {
    match &user.email {
        Some(email) => format!("{} <{}> ({})", user.username, email, user.role),
        None => format!("{} ({})", user.username, user.role),
    }
}
