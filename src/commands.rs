// Command dispatcher: maps each parsed CLI command onto exactly one API
// facade call and renders the result. Primary content for posts and
// comments can come from an argument, piped stdin, or interactive prompts;
// local usage mistakes are raised before any network activity.

use std::io::Read;
use std::path::PathBuf;

use dialoguer::Input;

use crate::api::ApiClient;
use crate::cli::{
    CommentCommands, Commands, DmCommands, FollowCommands, ModCommands, PostCommands,
    ProfileCommands, SubmoltCommands,
};
use crate::config::{self, Credentials};
use crate::error::{Error, Result};
use crate::output;

/// Process-lifetime dependencies, constructed once in `main` and threaded
/// through the dispatcher so tests can substitute every piece.
pub struct Session {
    pub api: ApiClient,
    pub stdin_is_tty: bool,
    pub credentials_path: PathBuf,
}

pub fn dispatch(session: &Session, command: Commands) -> Result<()> {
    match command {
        Commands::Register { name, description } => register(session, &name, &description),
        Commands::Status => output::print_typed(&session.api.check_status()?),
        Commands::Feed {
            sort,
            limit,
            submolt,
            personalized,
        } => {
            let feed = if personalized {
                session.api.get_personalized_feed(sort.as_str(), limit)?
            } else {
                session
                    .api
                    .get_feed(sort.as_str(), limit, submolt.as_deref())?
            };
            output::print_typed(&feed)
        }
        Commands::Search { query, kind, limit } => {
            output::print_raw(&session.api.search(&query, kind.as_str(), limit)?);
            Ok(())
        }
        Commands::Post(command) => post(session, command),
        Commands::Comment(command) => comment(session, command),
        Commands::Submolt(command) => submolt(session, command),
        Commands::Follow(command) => follow(session, command),
        Commands::Profile(command) => profile(session, command),
        Commands::Mod(command) => moderation(session, command),
        Commands::Dm(command) => dm(session, command),
    }
}

fn register(session: &Session, name: &str, description: &str) -> Result<()> {
    let bar = output::spinner("Registering...");
    let result = session.api.register(name, description);
    bar.finish_and_clear();
    let response = result?;

    output::print_typed(&response)?;

    // Persist the key right away; re-registration overwrites.
    let agent_name = response
        .agent
        .name
        .clone()
        .unwrap_or_else(|| name.to_string());
    let credentials = Credentials {
        api_key: response.agent.api_key.clone(),
        agent_name,
    };
    config::save_to(&session.credentials_path, &credentials)?;

    output::success(&format!(
        "Credentials saved to {}",
        session.credentials_path.display()
    ));
    output::info(&format!("Claim URL: {}", response.agent.claim_url));
    output::info(&format!(
        "Verification code: {}",
        response.agent.verification_code
    ));
    Ok(())
}

fn post(session: &Session, command: PostCommands) -> Result<()> {
    match command {
        PostCommands::Create {
            submolt,
            title,
            content,
            url,
            interactive,
        } => {
            let (submolt, title, content, url) = if interactive {
                prompt_post_fields()?
            } else {
                let content = match content {
                    Some(content) => Some(content),
                    None => Some(read_piped_content(session.stdin_is_tty)?),
                };
                (submolt, title, content, url)
            };
            let title = title.ok_or_else(|| Error::Usage("title is required".to_string()))?;
            let body = session.api.create_post(
                &submolt,
                &title,
                content.as_deref().filter(|content| !content.is_empty()),
                url.as_deref(),
            )?;
            output::print_raw(&body);
            Ok(())
        }
        PostCommands::Get { post_id } => output::print_typed(&session.api.get_post(&post_id)?),
        PostCommands::Delete { post_id } => {
            output::print_raw(&session.api.delete_post(&post_id)?);
            Ok(())
        }
        PostCommands::Upvote { post_id } => {
            output::print_raw(&session.api.upvote_post(&post_id)?);
            Ok(())
        }
        PostCommands::Downvote { post_id } => {
            output::print_raw(&session.api.downvote_post(&post_id)?);
            Ok(())
        }
    }
}

fn comment(session: &Session, command: CommentCommands) -> Result<()> {
    match command {
        CommentCommands::Add {
            post_id,
            content,
            parent_id,
            interactive,
        } => {
            let (content, parent_id) = if interactive {
                prompt_comment_fields()?
            } else {
                let content = match content {
                    Some(content) => content,
                    None => read_piped_content(session.stdin_is_tty)?,
                };
                (content, parent_id)
            };
            let body = session
                .api
                .add_comment(&post_id, &content, parent_id.as_deref())?;
            output::print_raw(&body);
            Ok(())
        }
        CommentCommands::Get { post_id, sort } => {
            output::print_typed(&session.api.get_comments(&post_id, sort.as_str())?)
        }
        CommentCommands::Upvote { comment_id } => {
            output::print_raw(&session.api.upvote_comment(&comment_id)?);
            Ok(())
        }
    }
}

fn submolt(session: &Session, command: SubmoltCommands) -> Result<()> {
    let body = match command {
        SubmoltCommands::Create {
            name,
            display_name,
            description,
        } => session
            .api
            .create_submolt(&name, &display_name, &description)?,
        SubmoltCommands::List => session.api.list_submolts()?,
        SubmoltCommands::Get { name } => session.api.get_submolt(&name)?,
        SubmoltCommands::Subscribe { name } => session.api.subscribe_submolt(&name)?,
        SubmoltCommands::Unsubscribe { name } => session.api.unsubscribe_submolt(&name)?,
    };
    output::print_raw(&body);
    Ok(())
}

fn follow(session: &Session, command: FollowCommands) -> Result<()> {
    let body = match command {
        FollowCommands::Add { agent_name } => session.api.follow_molty(&agent_name)?,
        FollowCommands::Remove { agent_name } => session.api.unfollow_molty(&agent_name)?,
    };
    output::print_raw(&body);
    Ok(())
}

fn profile(session: &Session, command: ProfileCommands) -> Result<()> {
    let body = match command {
        ProfileCommands::Get => session.api.get_profile()?,
        ProfileCommands::View { agent_name } => session.api.get_agent_profile(&agent_name)?,
        ProfileCommands::Update {
            description,
            metadata,
        } => {
            let metadata = metadata
                .map(|text| {
                    serde_json::from_str(&text).map_err(|e| {
                        Error::Usage(format!("metadata is not valid JSON: {e}"))
                    })
                })
                .transpose()?;
            session.api.update_profile(description.as_deref(), metadata)?
        }
        ProfileCommands::AvatarUpload { file_path } => {
            let bar = output::spinner("Uploading...");
            let result = session.api.upload_avatar(&file_path);
            bar.finish_and_clear();
            result?
        }
        ProfileCommands::AvatarRemove => session.api.remove_avatar()?,
    };
    output::print_raw(&body);
    Ok(())
}

fn moderation(session: &Session, command: ModCommands) -> Result<()> {
    let body = match command {
        ModCommands::Pin { post_id } => session.api.pin_post(&post_id)?,
        ModCommands::Unpin { post_id } => session.api.unpin_post(&post_id)?,
        ModCommands::Settings {
            submolt_name,
            description,
            banner_color,
            theme_color,
        } => session.api.update_submolt_settings(
            &submolt_name,
            description.as_deref(),
            banner_color.as_deref(),
            theme_color.as_deref(),
        )?,
        ModCommands::AvatarUpload {
            submolt_name,
            file_path,
        } => {
            let bar = output::spinner("Uploading...");
            let result = session.api.upload_submolt_avatar(&submolt_name, &file_path);
            bar.finish_and_clear();
            result?
        }
        ModCommands::BannerUpload {
            submolt_name,
            file_path,
        } => {
            let bar = output::spinner("Uploading...");
            let result = session.api.upload_submolt_banner(&submolt_name, &file_path);
            bar.finish_and_clear();
            result?
        }
        ModCommands::ModAdd {
            submolt_name,
            agent_name,
        } => session.api.add_moderator(&submolt_name, &agent_name)?,
        ModCommands::ModRemove {
            submolt_name,
            agent_name,
        } => session.api.remove_moderator(&submolt_name, &agent_name)?,
        ModCommands::ModList { submolt_name } => session.api.list_moderators(&submolt_name)?,
    };
    output::print_raw(&body);
    Ok(())
}

fn dm(session: &Session, command: DmCommands) -> Result<()> {
    let body = match command {
        DmCommands::Check => session.api.check_dms()?,
        DmCommands::Requests => session.api.list_dm_requests()?,
        DmCommands::Approve { conversation_id } => {
            session.api.approve_dm_request(&conversation_id)?
        }
        DmCommands::Conversations => session.api.list_conversations()?,
        DmCommands::Get { conversation_id } => session.api.get_conversation(&conversation_id)?,
        DmCommands::Send {
            conversation_id,
            message,
        } => session.api.send_dm(&conversation_id, &message)?,
        DmCommands::Request { to, message } => session.api.request_dm(&to, &message)?,
    };
    output::print_raw(&body);
    Ok(())
}

/// Read primary content from piped stdin. With an interactive terminal and
/// nothing piped there is nothing to read, so this is a usage error.
fn read_piped_content(stdin_is_tty: bool) -> Result<String> {
    if stdin_is_tty {
        return Err(Error::Usage(
            "content is required when not piping from stdin".to_string(),
        ));
    }
    let mut content = String::new();
    std::io::stdin().read_to_string(&mut content)?;
    Ok(content)
}

fn prompt_post_fields() -> Result<(String, Option<String>, Option<String>, Option<String>)> {
    let submolt: String = Input::new()
        .with_prompt("Submolt name")
        .default("general".to_string())
        .interact_text()?;
    let title: String = Input::new().with_prompt("Post title").interact_text()?;
    let content: String = Input::new()
        .with_prompt("Post content")
        .allow_empty(true)
        .interact_text()?;
    let url: String = Input::new()
        .with_prompt("Post URL (for link posts)")
        .allow_empty(true)
        .interact_text()?;
    Ok((
        submolt,
        Some(title),
        (!content.is_empty()).then_some(content),
        (!url.is_empty()).then_some(url),
    ))
}

fn prompt_comment_fields() -> Result<(String, Option<String>)> {
    let parent: String = Input::new()
        .with_prompt("Parent comment ID or URL (for replies)")
        .allow_empty(true)
        .interact_text()?;
    let content: String = Input::new()
        .with_prompt("Comment content")
        .allow_empty(true)
        .interact_text()?;
    Ok((content, (!parent.is_empty()).then_some(parent)))
}
