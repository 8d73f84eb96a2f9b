//! UI Routes - the single-page labeling interface
//!
//! Vanilla HTML/CSS/JS served inline; all state lives behind the JSON API.

use axum::{
    response::{Html, IntoResponse},
    routing::get,
    Router,
};

use crate::AppState;

/// Build UI routes
pub fn ui_routes() -> Router<AppState> {
    Router::new().route("/", get(root_page))
}

/// GET /
async fn root_page() -> impl IntoResponse {
    Html(INDEX_HTML)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Twitch Sentiment Labeler</title>
    <style>
        body {
            font-family: system-ui, -apple-system, sans-serif;
            max-width: 1100px;
            margin: 20px auto;
            padding: 0 20px;
            line-height: 1.5;
            color: #222;
        }
        h1 {
            border-bottom: 2px solid #9146ff;
            padding-bottom: 8px;
        }
        .layout {
            display: grid;
            grid-template-columns: 2fr 1fr;
            gap: 24px;
        }
        .card {
            border: 1px solid #ddd;
            border-radius: 6px;
            padding: 16px;
            margin-bottom: 16px;
        }
        .message {
            font-size: 1.3em;
            background: #f4f0ff;
            padding: 14px;
            border-radius: 4px;
            white-space: pre-wrap;
            word-break: break-word;
        }
        .muted { color: #777; }
        .banner { padding: 10px; border-radius: 4px; margin-bottom: 12px; display: none; }
        .banner.ok { background: #e6f6ea; color: #1d6b2f; display: block; }
        .banner.err { background: #fdecea; color: #8a1c13; display: block; }
        .sentiments label { display: block; margin: 4px 0; cursor: pointer; }
        button {
            padding: 8px 16px;
            border: none;
            border-radius: 4px;
            background: #9146ff;
            color: white;
            cursor: pointer;
            margin-right: 6px;
        }
        button.secondary { background: #666; }
        button:disabled { background: #bbb; cursor: default; }
        progress { width: 100%; height: 16px; }
        table { width: 100%; border-collapse: collapse; font-size: 0.9em; }
        td, th { text-align: left; padding: 4px; border-bottom: 1px solid #eee; }
        details { margin-bottom: 8px; }
    </style>
</head>
<body>
    <h1>Twitch Chat Sentiment Labeler</h1>
    <div id="banner" class="banner"></div>

    <div class="layout">
        <main>
            <div class="card">
                <label>Your name:
                    <input id="labeler" type="text" placeholder="e.g. Student 1">
                </label>
                <span id="dataset" class="muted"></span>
                <button id="load" class="secondary">Load dataset</button>
            </div>

            <div class="card">
                <div><span id="progress-text"></span></div>
                <progress id="progress" max="100" value="0"></progress>
            </div>

            <div class="card">
                <div class="muted">Message <span id="message-id">-</span></div>
                <div id="message" class="message muted">Press "Next message" to start.</div>
            </div>

            <div class="card">
                <div id="sentiments" class="sentiments"></div>
                <p>
                    <label>Confidence:
                        <select id="confidence"></select>
                    </label>
                </p>
                <button id="submit">Submit label</button>
                <button id="skip" class="secondary">Skip</button>
                <button id="next" class="secondary">Next message</button>
            </div>

            <div class="card">
                <h3>Recent labels</h3>
                <table>
                    <thead><tr><th>ID</th><th>Message</th><th>Sentiment</th><th>Conf.</th><th>By</th><th>When</th></tr></thead>
                    <tbody id="recent"></tbody>
                </table>
            </div>
        </main>

        <aside>
            <div class="card">
                <h3>Team progress</h3>
                <div id="stats-summary" class="muted">No data yet</div>
                <h4>By labeler</h4>
                <table><tbody id="per-labeler"></tbody></table>
                <h4>By sentiment</h4>
                <table><tbody id="per-sentiment"></tbody></table>
            </div>
            <div class="card">
                <h3>Labeling guide</h3>
                <div id="guide"></div>
            </div>
            <div class="muted" id="build"></div>
        </aside>
    </div>

    <script>
        const $ = (id) => document.getElementById(id);

        function showBanner(kind, text) {
            const banner = $('banner');
            banner.className = 'banner ' + kind;
            banner.textContent = text;
        }

        function escapeHtml(text) {
            const div = document.createElement('div');
            div.textContent = text;
            return div.innerHTML;
        }

        async function api(method, path, body) {
            const options = { method, headers: {} };
            if (body !== undefined) {
                options.headers['Content-Type'] = 'application/json';
                options.body = JSON.stringify(body);
            }
            const response = await fetch(path, options);
            const data = await response.json();
            if (!response.ok) {
                throw new Error(data.error ? data.error.message : response.statusText);
            }
            return data;
        }

        function renderSession(session) {
            const item = session.current_item;
            $('message-id').textContent = item ? item.message_id : '-';
            $('message').textContent = item ? item.message : 'Press "Next message" to start.';
            $('message').classList.toggle('muted', !item);
            $('submit').disabled = !item;
            $('skip').disabled = !item;

            const p = session.progress;
            $('progress').value = p.percent;
            $('progress-text').textContent =
                `Labeled this run: ${p.labeled} / ${p.target} (${p.percent.toFixed(1)}%)`;
            $('dataset').textContent = session.dataset_size > 0
                ? `${session.dataset_size} messages loaded`
                : 'No messages loaded';
            $('next').disabled = session.dataset_size === 0;
        }

        function renderCounts(tbody, entries) {
            tbody.innerHTML = entries
                .map(e => `<tr><td>${escapeHtml(e.name || '(anonymous)')}</td><td>${e.count}</td></tr>`)
                .join('');
        }

        async function refreshStats() {
            const labeler = encodeURIComponent($('labeler').value.trim());
            const stats = await api('GET', `/api/stats?labeler=${labeler}`);
            if (!stats.available || stats.total === 0) {
                $('stats-summary').textContent = 'No data yet';
            } else {
                const mine = stats.labeler_total !== null && stats.labeler_total !== undefined
                    ? ` | yours: ${stats.labeler_total}` : '';
                $('stats-summary').textContent =
                    `Total: ${stats.total} | team members: ${stats.team_members}${mine}`;
            }
            renderCounts($('per-labeler'), stats.per_labeler);
            renderCounts($('per-sentiment'), stats.per_sentiment);
            $('recent').innerHTML = stats.recent.slice().reverse().map(r => `
                <tr>
                    <td>${r.message_id}</td>
                    <td>${escapeHtml(r.message)}</td>
                    <td>${r.sentiment}</td>
                    <td>${r.confidence}</td>
                    <td>${escapeHtml(r.labeled_by)}</td>
                    <td>${r.timestamp}</td>
                </tr>`).join('');
        }

        async function loadGuide() {
            const guide = await api('GET', '/api/guide');
            $('sentiments').innerHTML = guide.categories.map(c => `
                <label title="${escapeHtml(c.description)}">
                    <input type="radio" name="sentiment" value="${c.name}">
                    ${c.emoji} ${c.name} <span class="muted">- ${escapeHtml(c.description)}</span>
                </label>`).join('');
            $('confidence').innerHTML = guide.confidence
                .map(c => `<option value="${c.value}" ${c.value === 3 ? 'selected' : ''}>${c.value} - ${c.label}</option>`)
                .join('');
            $('guide').innerHTML = guide.categories.map(c => `
                <details>
                    <summary>${c.emoji} ${c.name}</summary>
                    <div>${escapeHtml(c.description)}</div>
                    <div class="muted">Examples: ${c.examples.map(escapeHtml).join(', ')}</div>
                    <div class="muted">Signs: ${escapeHtml(c.signs)}</div>
                </details>`).join('');
        }

        async function run(action) {
            try {
                await action();
            } catch (e) {
                showBanner('err', e.message);
            }
        }

        $('load').onclick = () => run(async () => {
            showBanner('ok', 'Loading dataset...');
            const dataset = await api('POST', '/api/dataset/load');
            showBanner('ok', `Loaded ${dataset.size} messages`);
            renderSession(await api('POST', '/api/session/next'));
        });

        $('next').onclick = () => run(async () => {
            renderSession(await api('POST', '/api/session/next'));
        });

        $('skip').onclick = () => run(async () => {
            await api('POST', '/api/session/skip');
            renderSession(await api('POST', '/api/session/next'));
        });

        $('submit').onclick = () => run(async () => {
            const choice = document.querySelector('input[name="sentiment"]:checked');
            const result = await api('POST', '/api/session/submit', {
                sentiment: choice ? choice.value : '',
                confidence: parseInt($('confidence').value, 10),
                labeler: $('labeler').value.trim(),
            });
            showBanner('ok', `Saved ${result.record.message_id} as ${result.record.sentiment}`);
            if (choice) choice.checked = false;
            renderSession(await api('POST', '/api/session/next'));
            await refreshStats();
        });

        $('labeler').onchange = () => {
            localStorage.setItem('tsl-labeler', $('labeler').value.trim());
            run(refreshStats);
        };

        run(async () => {
            await loadGuide();
            const session = await api('GET', '/api/session');
            $('labeler').value = localStorage.getItem('tsl-labeler') || session.labeler;
            renderSession(session);
            await refreshStats();
            const build = await api('GET', '/api/buildinfo');
            $('build').textContent = `v${build.version} [${build.git_hash}] ${build.build_profile}`;
        });
    </script>
</body>
</html>
"#;
