//! Web UI
//!
//! Serves the single-page interface: upload form, analysis card, history
//! panel, tabbed result panels, and the save-to-account action. The page
//! is embedded in the binary; build identification is stamped into the
//! header at request time.

use crate::AppState;
use axum::response::{Html, IntoResponse};
use axum::{routing::get, Router};

pub fn ui_routes() -> Router<AppState> {
    Router::new().route("/", get(root_page))
}

/// GET /
///
/// Landing page with upload, analysis, and result panels
async fn root_page() -> impl IntoResponse {
    let html = PAGE
        .replace("{{VERSION}}", env!("CARGO_PKG_VERSION"))
        .replace("{{GIT_HASH}}", env!("GIT_HASH"))
        .replace("{{BUILD_TIMESTAMP}}", env!("BUILD_TIMESTAMP"))
        .replace("{{BUILD_PROFILE}}", env!("BUILD_PROFILE"));
    Html(html)
}

const PAGE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>MoodFlow</title>
    <style>
        * {
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }
        body {
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            background-color: #1a1a1a;
            color: #e0e0e0;
            line-height: 1.6;
        }
        header {
            background-color: #2a2a2a;
            border-bottom: 1px solid #3a3a3a;
            padding: 20px;
            margin-bottom: 20px;
        }
        .header-content {
            display: flex;
            justify-content: space-between;
            align-items: center;
        }
        .header-right {
            text-align: right;
            font-size: 13px;
            color: #888;
            font-family: 'Courier New', monospace;
            line-height: 1.2;
        }
        h1 {
            font-size: 26px;
            margin-bottom: 5px;
            color: #4a9eff;
        }
        .subtitle {
            color: #888;
            font-size: 15px;
        }
        .layout {
            display: flex;
            gap: 20px;
            padding: 0 20px 40px;
        }
        .sidebar {
            width: 260px;
            flex-shrink: 0;
        }
        .main {
            flex: 1;
            min-width: 0;
        }
        .panel {
            background: #242424;
            border: 1px solid #3a3a3a;
            border-radius: 6px;
            padding: 16px;
            margin-bottom: 16px;
        }
        h2 {
            color: #4a9eff;
            font-size: 18px;
            margin-bottom: 10px;
        }
        .caption {
            color: #888;
            font-size: 13px;
        }
        .button {
            display: inline-block;
            padding: 8px 16px;
            background: #4a9eff;
            color: white;
            text-decoration: none;
            border: none;
            border-radius: 4px;
            margin: 6px 4px 0 0;
            font-weight: 600;
            cursor: pointer;
            font-size: 14px;
        }
        .button:hover {
            background: #3a8eef;
        }
        .button:disabled {
            background: #555;
            cursor: default;
        }
        .tabs {
            display: flex;
            gap: 4px;
            margin-bottom: 12px;
        }
        .tab {
            padding: 8px 14px;
            background: #2e2e2e;
            border: 1px solid #3a3a3a;
            border-radius: 4px 4px 0 0;
            cursor: pointer;
            font-size: 14px;
        }
        .tab.active {
            background: #4a9eff;
            color: #fff;
        }
        .item {
            display: flex;
            gap: 12px;
            align-items: center;
            padding: 8px 0;
            border-bottom: 1px solid #2e2e2e;
        }
        .item img {
            width: 56px;
            height: 56px;
            object-fit: cover;
            border-radius: 4px;
        }
        .item a {
            color: #4a9eff;
            text-decoration: none;
            font-weight: 600;
        }
        .item .meta {
            color: #888;
            font-size: 13px;
        }
        .badge {
            display: inline-block;
            padding: 2px 8px;
            border-radius: 10px;
            background: #333;
            font-size: 12px;
            margin-right: 4px;
        }
        .warning {
            color: #f59e0b;
            font-size: 13px;
        }
        .error {
            color: #ef4444;
            font-size: 14px;
        }
        #status {
            margin-top: 8px;
            font-size: 14px;
            color: #888;
        }
    </style>
</head>
<body>
    <header>
        <div class="header-content">
            <div>
                <h1>MoodFlow</h1>
                <div class="subtitle">Upload a clip, get mood-matched music</div>
            </div>
            <div class="header-right">
                <div>v{{VERSION}} [{{GIT_HASH}}]</div>
                <div>{{BUILD_TIMESTAMP}}</div>
                <div>{{BUILD_PROFILE}}</div>
            </div>
        </div>
    </header>

    <div class="layout">
        <div class="sidebar">
            <div class="panel">
                <h2>History</h2>
                <div id="history"><span class="caption">No sessions yet.</span></div>
            </div>
            <div class="panel">
                <h2>Account</h2>
                <div id="account"><span class="caption">Not logged in.</span></div>
                <a class="button" href="/auth/login">Log in</a>
            </div>
        </div>

        <div class="main">
            <div class="panel">
                <h2>Upload</h2>
                <input type="file" id="file" accept=".mp3,.wav,.ogg,.flac,audio/*">
                <button class="button" id="analyze">Analyze</button>
                <div id="status"></div>
            </div>

            <div class="panel" id="analysis-panel" style="display:none">
                <h2>Your Analysis</h2>
                <div id="analysis"></div>
            </div>

            <div class="panel" id="results-panel" style="display:none">
                <div class="tabs" id="tabs">
                    <div class="tab active" data-tab="artists">Artists</div>
                    <div class="tab" data-tab="tracks">Tracks</div>
                    <div class="tab" data-tab="albums">Albums</div>
                    <div class="tab" data-tab="playlists">Playlists</div>
                    <div class="tab" data-tab="recommendations">Auto-playlist</div>
                </div>
                <div id="tab-content"></div>
                <button class="button" id="save" style="display:none">Save to my account</button>
            </div>
        </div>
    </div>

    <script>
        let current = { seedGenre: null, mood: null, recommendations: [] };

        async function fetchJson(url, options) {
            const response = await fetch(url, options);
            const body = await response.json().catch(() => ({}));
            if (!response.ok) {
                const message = body.error ? body.error.message : response.statusText;
                throw new Error(message);
            }
            return body;
        }

        async function refreshHistory() {
            try {
                const history = await fetchJson('/api/history');
                const target = document.getElementById('history');
                if (!history.recent.length) {
                    target.innerHTML = '<span class="caption">No sessions yet.</span>';
                    return;
                }
                target.innerHTML = history.recent.map(h =>
                    '<div class="caption">' + h.timestamp + ' &bull; mood=' + h.mood +
                    ' &bull; genre=' + h.genre + '</div>'
                ).join('');
            } catch (e) { /* history is non-essential */ }
        }

        async function refreshAccount() {
            try {
                const me = await fetchJson('/api/me');
                document.getElementById('account').innerHTML =
                    '<span class="caption">Logged in as ' + (me.display_name || me.id) + '</span>';
            } catch (e) { /* stays "Not logged in" */ }
        }

        function renderItems(items, kind) {
            if (!items.length) {
                return '<span class="caption">Nothing found.</span>';
            }
            return items.map(item => {
                const image = item.image || item.cover;
                const label = item.name || item.title;
                const parts = [];
                if (item.artist) parts.push(item.artist);
                if (item.owner) parts.push(item.owner);
                if (item.genres && item.genres.length) parts.push(item.genres.slice(0, 4).join(', '));
                if (item.release_date) parts.push(item.release_date);
                if (kind === 'recommendations' && item.audio_features) {
                    const f = item.audio_features;
                    const bits = [];
                    if (f.energy != null) bits.push('energy=' + f.energy.toFixed(2));
                    if (f.valence != null) bits.push('valence=' + f.valence.toFixed(2));
                    if (f.danceability != null) bits.push('danceability=' + f.danceability.toFixed(2));
                    if (bits.length) parts.push(bits.join(' &bull; '));
                }
                return '<div class="item">' +
                    (image ? '<img src="' + image + '" alt="">' : '') +
                    '<div><a href="' + (item.url || '#') + '" target="_blank">' + label + '</a>' +
                    '<div class="meta">' + parts.join(' &bull; ') + '</div></div>' +
                    '</div>';
            }).join('');
        }

        async function loadTab(tab) {
            const content = document.getElementById('tab-content');
            const save = document.getElementById('save');
            save.style.display = 'none';
            content.innerHTML = '<span class="caption">Loading&hellip;</span>';
            try {
                let items;
                if (tab === 'recommendations') {
                    items = await fetchJson('/api/recommendations?genre=' +
                        encodeURIComponent(current.seedGenre) + '&mood=' +
                        encodeURIComponent(current.mood) + '&limit=10');
                    current.recommendations = items;
                    if (items.length) save.style.display = 'inline-block';
                } else {
                    items = await fetchJson('/api/' + tab + '?genre=' +
                        encodeURIComponent(current.seedGenre));
                }
                content.innerHTML = renderItems(items, tab);
            } catch (e) {
                content.innerHTML = '<div class="error">' + e.message + '</div>';
            }
        }

        document.getElementById('tabs').addEventListener('click', event => {
            const tab = event.target.closest('.tab');
            if (!tab || !current.seedGenre) return;
            document.querySelectorAll('.tab').forEach(t => t.classList.remove('active'));
            tab.classList.add('active');
            loadTab(tab.dataset.tab);
        });

        document.getElementById('analyze').addEventListener('click', async () => {
            const input = document.getElementById('file');
            const status = document.getElementById('status');
            if (!input.files.length) {
                status.innerHTML = '<span class="warning">Choose an audio file first.</span>';
                return;
            }
            status.textContent = 'Analyzing audio…';
            const form = new FormData();
            form.append('file', input.files[0]);
            try {
                const analysis = await fetchJson('/api/analyze', { method: 'POST', body: form });
                current.seedGenre = analysis.seed_genre;
                current.mood = analysis.mood;
                status.textContent = '';
                document.getElementById('analysis-panel').style.display = 'block';
                document.getElementById('analysis').innerHTML =
                    '<div><span class="badge">mood: ' + analysis.mood + '</span>' +
                    '<span class="badge">genre seed: ' + analysis.seed_genre +
                    ' (guess was ' + analysis.genre_guess + ')</span></div>' +
                    '<div class="caption" style="margin-top:8px">' + analysis.explanation + '</div>' +
                    '<details style="margin-top:8px"><summary class="caption">Extracted features</summary>' +
                    '<pre class="caption">' + JSON.stringify(analysis.features, null, 2) + '</pre></details>';
                document.getElementById('results-panel').style.display = 'block';
                document.querySelectorAll('.tab').forEach(t => t.classList.remove('active'));
                document.querySelector('.tab[data-tab="artists"]').classList.add('active');
                loadTab('artists');
                refreshHistory();
            } catch (e) {
                status.innerHTML = '<div class="error">' + e.message + '</div>';
            }
        });

        document.getElementById('save').addEventListener('click', async () => {
            const status = document.getElementById('status');
            const uris = current.recommendations.map(t => t.uri).filter(u => u);
            if (!uris.length) return;
            try {
                const saved = await fetchJson('/api/playlist', {
                    method: 'POST',
                    headers: { 'Content-Type': 'application/json' },
                    body: JSON.stringify({
                        name: 'MoodFlow: ' + current.mood + ' ' + current.seedGenre,
                        description: 'Generated by MoodFlow from an uploaded clip',
                        uris: uris
                    })
                });
                status.textContent = 'Saved playlist "' + saved.name + '" (' + saved.tracks_added + ' tracks).';
            } catch (e) {
                status.innerHTML = '<div class="error">' + e.message + '</div>';
            }
        });

        refreshHistory();
        refreshAccount();
    </script>
</body>
</html>
"##;
