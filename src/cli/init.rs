use serde_json::json;

use crate::cli::{exit_code, Context};
use crate::db::connection;
use crate::output;

pub fn run(ctx: &Context) -> i32 {
    let result = connection::init_db(&ctx.db_path).map(|path| {
        if ctx.json {
            output::json::print(&output::json::success(json!({
                "path": path.to_string_lossy()
            })));
        } else {
            println!("Initialized tasktree at {}", path.display());
        }
        0
    });
    exit_code(result, ctx.json)
}
