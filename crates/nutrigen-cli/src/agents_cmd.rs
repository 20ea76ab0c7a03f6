use nutrigen_core::agent::AgentTable;

/// Print the agent table, grouped as on the profile form.
pub fn run_agents(table: &AgentTable) {
    print!("{}", render_agents(table));
}

fn render_agents(table: &AgentTable) -> String {
    if table.is_empty() {
        return "No agents configured.\n".to_string();
    }

    let id_width = table.list().iter().map(|a| a.id.len()).max().unwrap_or(0);
    let mut out = String::new();
    let mut current_group: Option<&str> = None;

    for agent in table.list() {
        if current_group != Some(agent.group.as_str()) {
            if current_group.is_some() {
                out.push('\n');
            }
            out.push_str(&format!("[{}]\n", agent.group));
            current_group = Some(agent.group.as_str());
        }
        let served_by = if agent.emulate {
            format!("emulated on {}", agent.backing_model)
        } else {
            agent.backing_model.clone()
        };
        out.push_str(&format!(
            "  {:<id_width$}  {}  ({})  {}\n",
            agent.id, agent.name, agent.description, served_by
        ));
    }
    out
}
