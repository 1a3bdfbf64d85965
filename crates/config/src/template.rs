//! Default configuration template with all options documented.
//!
//! `botchoice config template` prints this so users can see every option,
//! including the ones they never change.

use crate::schema::{
    DEFAULT_MAX_RETRIES, DEFAULT_MAX_WORDS, IMAGE_KEYWORD, VIDEO_KEYWORD,
};

/// Bundled JSON template, the same content shipped as `config.json.template`.
pub const BUNDLED_JSON_TEMPLATE: &str = include_str!("../../../config.json.template");

/// Generate the commented TOML config template.
pub fn default_config_template() -> String {
    format!(
        r##"# botchoice configuration
# =======================
# Environment variable substitution is supported: ${{ENV_VAR}} or ${{ENV_VAR:-fallback}}
# Example: key = "${{OPENAI_API_KEY}}"

max_words = {DEFAULT_MAX_WORDS}           # Characters of input forwarded to completion backends
max_retries = {DEFAULT_MAX_RETRIES}              # Extra attempts after a failed dispatch
retry_delay_ms = 0             # Pause between attempts (0 = retry immediately)
completion_timeout_secs = 80   # Chat completion HTTP timeout
media_timeout_secs = 30        # Random media / image download timeout
media_extraction = false       # Scan completion output for media URLs and inline images
unclassified_as = "text"       # URLs with an unknown extension: "text" or "file"
max_image_bytes = 10485760     # Cap for eagerly downloaded images

short_help_text = "发送特定指令以调度不同任务的bot！"
long_help_text = """
📚 发送关键词执行任务bot！/GPT/星火/随机模型等🔥 /sjxjj: 获取随机搞笑视频。
🖼️ /sjtp: 获取随机图片。
"""

# ══════════════════════════════════════════════════════════════════════════════
# BACKENDS
# ══════════════════════════════════════════════════════════════════════════════
# Each entry binds a keyword to a backend. Entries are checked in order and
# every entry whose keyword appears in a message is invoked.

[[bot_list]]
keyword = "{VIDEO_KEYWORD}"
url = "https://api.pearktrue.cn/api/random/xjj/"

[[bot_list]]
keyword = "{IMAGE_KEYWORD}"
url = "https://api.mossia.top/randPic/pixiv"

# OpenAI-compatible completion backend: set both model and key.
# [[bot_list]]
# keyword = "/gpt"
# url = "https://api.openai.com/v1"
# model = "gpt-4o-mini"
# key = "${{OPENAI_API_KEY}}"

# Custom random-media backend.
# [[bot_list]]
# keyword = "/cat"
# url = "https://cats.example.com/random"
# [bot_list.media]
# query = "format=json"
# result_field = "url"
# kind = "image"                 # image, video or file
# failure_text = "获取猫图失败，请稍后再试"
"##
    )
}
