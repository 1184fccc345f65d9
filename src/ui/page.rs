//! Full-page shell.

/// htmx bundle, relative to the static directory. Must be provided at deploy time.
pub const HTMX_ASSET: &str = "vendor/htmx-2.0.8.min.js";

/// Generate the HTML shell for the application.
#[must_use]
pub fn html_shell(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="description" content="Symptom checker">
    <title>{title} - Symptom Checker</title>

    <!-- HTMX (local, no CDN) -->
    <script src="/static/{HTMX_ASSET}"></script>
    <link rel="stylesheet" href="/static/app.css">
</head>
<body class="min-h-screen bg-background text-textPrimary antialiased">
    <header class="sticky top-0 z-50 w-full bg-surfaceContainer shadow-sm">
        <div class="container mx-auto flex h-14 items-center px-4 max-w-3xl">
            <a href="/" class="font-semibold">Symptom Checker</a>
        </div>
    </header>

    <main id="app" class="container mx-auto px-4 py-6 max-w-3xl">
        {content}
    </main>

    <footer class="py-4">
        <p class="text-xs text-textMuted text-center">
            Results are informational only and are not a diagnosis.
        </p>
    </footer>
</body>
</html>"#,
        title = super::markup::escape(title),
    )
}
