//! Server-side HTML view layer. Pages are composed from small builders;
//! every interpolated value goes through `escape`. The handshake sections
//! expose usernames and tokens as data attributes for the client-side key
//! exchange script.

use md5::{Digest, Md5};

use warble_db::models::{HandshakeRow, MessageRow};
use warble_types::api::Claims;

pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Gravatar image URL for an email address.
pub fn gravatar_url(email: &str, size: u32) -> String {
    let digest = Md5::digest(email.trim().to_lowercase().as_bytes());
    format!(
        "https://www.gravatar.com/avatar/{}?d=identicon&s={}",
        hex::encode(digest),
        size
    )
}

/// Display form of a unix timestamp.
pub fn format_datetime(timestamp: i64) -> String {
    chrono::DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d @ %H:%M").to_string())
        .unwrap_or_default()
}

fn layout(title: &str, viewer: Option<&Claims>, flash: Option<&str>, body: &str) -> String {
    let nav = match viewer {
        Some(claims) => format!(
            "<a href=\"/\">my timeline</a> | <a href=\"/public\">public timeline</a> | \
             <a href=\"/logout\">sign out [{}]</a>",
            escape(&claims.username)
        ),
        None => "<a href=\"/public\">public timeline</a> | \
                 <a href=\"/login\">sign in</a> | <a href=\"/register\">sign up</a>"
            .to_string(),
    };

    let flash_html = flash
        .map(|message| format!("<div class=\"flash\">{}</div>\n", escape(message)))
        .unwrap_or_default();

    format!(
        "<!doctype html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{} | Warble</title>\n</head>\n<body>\n\
         <h1>Warble</h1>\n<div class=\"navigation\">{}</div>\n\
         {}<h2>{}</h2>\n{}\n</body>\n</html>\n",
        escape(title),
        nav,
        flash_html,
        escape(title),
        body
    )
}

fn error_html(error: Option<&str>) -> String {
    error
        .map(|message| {
            format!(
                "<p class=\"error\"><strong>Error:</strong> {}</p>\n",
                escape(message)
            )
        })
        .unwrap_or_default()
}

fn message_list(messages: &[MessageRow]) -> String {
    if messages.is_empty() {
        return "<p class=\"empty\">There's nothing here so far.</p>".to_string();
    }

    let mut out = String::from("<ul class=\"messages\">\n");
    for message in messages {
        out.push_str(&format!(
            "<li><img src=\"{}\" width=\"48\" height=\"48\"> \
             <strong><a href=\"/{}\">{}</a></strong> {} \
             <small>&mdash; {}</small></li>\n",
            gravatar_url(&message.email, 48),
            escape(&message.username),
            escape(&message.username),
            escape(&message.text),
            format_datetime(message.pub_date),
        ));
    }
    out.push_str("</ul>\n");
    out
}

fn handshake_list(class: &str, heading: &str, rows: &[HandshakeRow]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut out = format!("<div class=\"{class}s\"><h3>{heading}</h3>\n<ul>\n");
    for row in rows {
        out.push_str(&format!(
            "<li class=\"{}\" data-username=\"{}\" data-token=\"{}\">{}</li>\n",
            class,
            escape(&row.username),
            escape(&row.token),
            escape(&row.username),
        ));
    }
    out.push_str("</ul></div>\n");
    out
}

fn share_form() -> &'static str {
    // The hidden token field is filled client-side from the active follow
    // grants before submit.
    "<form action=\"/add_message\" method=\"post\">\n\
     <p>What's on your mind? <input type=\"text\" name=\"text\" size=\"60\">\n\
     <input type=\"hidden\" name=\"token\" value=\"\">\n\
     <input type=\"submit\" value=\"Share\"></p>\n\
     </form>\n"
}

pub fn own_timeline_page(
    viewer: &Claims,
    flash: Option<&str>,
    messages: &[MessageRow],
    follow_requests: &[HandshakeRow],
    approved_grants: &[HandshakeRow],
) -> String {
    let body = format!(
        "{}{}{}{}",
        share_form(),
        handshake_list("follow-request", "Follow requests", follow_requests),
        handshake_list(
            "approved-grant",
            "Approved follows awaiting acceptance",
            approved_grants
        ),
        message_list(messages),
    );
    layout("My Timeline", Some(viewer), flash, &body)
}

pub fn public_timeline_page(
    viewer: Option<&Claims>,
    flash: Option<&str>,
    messages: &[MessageRow],
) -> String {
    layout("Public Timeline", viewer, flash, &message_list(messages))
}

pub fn user_timeline_page(
    profile_username: &str,
    viewer: Option<&Claims>,
    followed: bool,
    flash: Option<&str>,
    messages: &[MessageRow],
) -> String {
    let controls = match viewer {
        Some(claims) if claims.username == profile_username => {
            "<p class=\"follow-status\">This is you!</p>\n".to_string()
        }
        Some(_) if followed => format!(
            "<p class=\"follow-status\">You are following this user. \
             <a href=\"/{}/unfollow\">Unfollow user</a></p>\n",
            escape(profile_username)
        ),
        Some(_) => format!(
            "<p class=\"follow-status\"><a href=\"/{}/follow\">Follow user</a></p>\n",
            escape(profile_username)
        ),
        None => String::new(),
    };

    let body = format!("{}{}", controls, message_list(messages));
    layout(
        &format!("{profile_username}'s Timeline"),
        viewer,
        flash,
        &body,
    )
}

pub fn login_page(error: Option<&str>, flash: Option<&str>) -> String {
    let body = format!(
        "{}<form action=\"/login\" method=\"post\">\n\
         <p><label>Username:</label> <input type=\"text\" name=\"username\"></p>\n\
         <p><label>Password:</label> <input type=\"password\" name=\"password\"></p>\n\
         <p><input type=\"submit\" value=\"Sign In\"></p>\n\
         </form>\n",
        error_html(error)
    );
    layout("Sign In", None, flash, &body)
}

pub fn register_page(error: Option<&str>, flash: Option<&str>) -> String {
    let body = format!(
        "{}<form action=\"/register\" method=\"post\">\n\
         <p><label>Username:</label> <input type=\"text\" name=\"username\"></p>\n\
         <p><label>E-Mail:</label> <input type=\"text\" name=\"email\"></p>\n\
         <p><label>Password:</label> <input type=\"password\" name=\"password\"></p>\n\
         <p><label>Password (repeat):</label> <input type=\"password\" name=\"password2\"></p>\n\
         <p><label>Public key:</label> <textarea name=\"pubkey\" rows=\"4\" cols=\"60\"></textarea></p>\n\
         <p><input type=\"submit\" value=\"Sign Up\"></p>\n\
         </form>\n",
        error_html(error)
    );
    layout("Sign Up", None, flash, &body)
}

pub fn follow_page(
    followuser: &str,
    viewer: &Claims,
    error: Option<&str>,
    flash: Option<&str>,
) -> String {
    let body = format!(
        "{}<form action=\"/{}/follow\" method=\"post\">\n\
         <p><label>Username:</label> <input type=\"text\" name=\"username\" value=\"{}\"></p>\n\
         <p><label>Hashtag:</label> <input type=\"text\" name=\"hashtag\"></p>\n\
         <p><label>Token:</label> <input type=\"text\" name=\"token\"></p>\n\
         <p><input type=\"submit\" value=\"Send follow request\"></p>\n\
         </form>\n",
        error_html(error),
        escape(followuser),
        escape(followuser),
    );
    layout(
        &format!("Follow {followuser}"),
        Some(viewer),
        flash,
        &body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(username: &str) -> Claims {
        Claims {
            sub: 1,
            username: username.into(),
            exp: 0,
        }
    }

    fn message(username: &str, text: &str) -> MessageRow {
        MessageRow {
            message_id: 1,
            author_id: 1,
            username: username.into(),
            email: format!("{username}@example.com"),
            text: text.into(),
            pub_date: 1_700_000_000,
            token: "tok".into(),
        }
    }

    #[test]
    fn escape_neutralizes_markup() {
        assert_eq!(
            escape("<script>\"&'</script>"),
            "&lt;script&gt;&quot;&amp;&#39;&lt;/script&gt;"
        );
    }

    #[test]
    fn gravatar_url_normalizes_the_email() {
        let url = gravatar_url("  Alice@Example.COM ", 48);
        assert_eq!(url, gravatar_url("alice@example.com", 48));
        assert!(url.starts_with("https://www.gravatar.com/avatar/"));
        assert!(url.ends_with("?d=identicon&s=48"));
    }

    #[test]
    fn format_datetime_is_stable() {
        assert_eq!(format_datetime(1_700_000_000), "2023-11-14 @ 22:13");
    }

    #[test]
    fn message_text_is_escaped_in_the_page() {
        let page = public_timeline_page(None, None, &[message("alice", "<script>alert(1)</script>")]);
        assert!(page.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!page.contains("<script>alert(1)"));
    }

    #[test]
    fn handshake_rows_carry_data_attributes() {
        let viewer = claims("bob");
        let page = own_timeline_page(
            &viewer,
            None,
            &[],
            &[HandshakeRow {
                username: "alice".into(),
                token: "req-tok".into(),
            }],
            &[],
        );
        assert!(page.contains("data-username=\"alice\""));
        assert!(page.contains("data-token=\"req-tok\""));
    }

    #[test]
    fn user_timeline_controls_follow_state() {
        let viewer = claims("alice");

        let own = user_timeline_page("alice", Some(&viewer), false, None, &[]);
        assert!(own.contains("This is you!"));

        let following = user_timeline_page("bob", Some(&viewer), true, None, &[]);
        assert!(following.contains("/bob/unfollow"));

        let not_following = user_timeline_page("bob", Some(&viewer), false, None, &[]);
        assert!(not_following.contains("/bob/follow"));

        let anonymous = user_timeline_page("bob", None, false, None, &[]);
        assert!(!anonymous.contains("/bob/follow"));
    }

    #[test]
    fn flash_is_rendered_once_at_the_top() {
        let page = public_timeline_page(None, Some("You were logged out"), &[]);
        assert!(page.contains("<div class=\"flash\">You were logged out</div>"));
    }
}
