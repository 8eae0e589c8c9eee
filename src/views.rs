//! Server-rendered pages. One shared layout, a few small bodies.

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title}</title>
</head>
<body>
  <nav><a href="/">Home</a> | <a href="/login">Login</a> | <a href="/register">Register</a></nav>
  <main>
{body}
  </main>
</body>
</html>
"#,
        title = escape(title),
        body = body
    )
}

fn flash_block(message: Option<&str>) -> String {
    match message {
        Some(msg) if !msg.is_empty() => format!(r#"    <p class="flash">{}</p>"#, escape(msg)),
        _ => String::new(),
    }
}

pub fn index() -> String {
    layout(
        "Welcome",
        r#"    <h1>Welcome</h1>
    <p><a href="/register">Create an account</a> or <a href="/login">log in</a>.</p>"#,
    )
}

pub fn login(message: Option<&str>) -> String {
    let body = format!(
        r#"    <h1>Login</h1>
{flash}
    <form action="/login" method="POST">
      <label>Email <input type="email" name="email" required></label>
      <label>Password <input type="password" name="password" required></label>
      <button type="submit">Login</button>
    </form>"#,
        flash = flash_block(message)
    );
    layout("Login", &body)
}

pub fn register(message: Option<&str>) -> String {
    let body = format!(
        r#"    <h1>Register</h1>
{flash}
    <form action="/register" method="POST">
      <label>Name <input type="text" name="name" required></label>
      <label>Email <input type="email" name="email" required></label>
      <label>Password <input type="password" name="password" required></label>
      <button type="submit">Register</button>
    </form>"#,
        flash = flash_block(message)
    );
    layout("Register", &body)
}

pub fn dashboard(name: &str, message: Option<&str>) -> String {
    let body = format!(
        r#"    <h1>Dashboard</h1>
{flash}
    <p>Hello, {name}!</p>"#,
        flash = flash_block(message),
        name = escape(name)
    );
    layout("Dashboard", &body)
}

/// Body for error responses that still send the browser somewhere.
pub fn redirect_notice(location: &str) -> String {
    let location = escape(location);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta http-equiv="refresh" content="0; url={location}"></head>
<body><a href="{location}">Continue</a></body>
</html>
"#
    )
}
