use promql_bridge::error::AppResult;

fn main() -> AppResult<()> {
    promql_bridge::entry::run()
}
