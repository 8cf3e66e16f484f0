use serde::{Deserialize, Serialize};

use crate::world::{AgentId, AgentSet, World};

/// Runtime value of the modeling language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Absence of an agent
    Nobody,
    /// Numbers are always doubles
    Number(f64),
    /// Boolean
    Boolean(bool),
    /// UTF-8 string
    String(String),
    /// Reference to a single agent
    Agent(AgentId),
    /// Reference to an agent collection
    AgentSet(AgentSet),
    /// Heterogeneous list
    List(Vec<Value>),
}

impl Value {
    /// Name of the value's runtime type, for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nobody => "nobody",
            Value::Number(_) => "number",
            Value::Boolean(_) => "boolean",
            Value::String(_) => "string",
            Value::Agent(_) => "agent",
            Value::AgentSet(_) => "agentset",
            Value::List(_) => "list",
        }
    }

    /// Render the value the way `print` shows it
    pub fn render(&self, world: &World) -> String {
        match self {
            Value::Nobody => "nobody".to_string(),
            Value::Number(num) => render_number(*num),
            Value::Boolean(flag) => flag.to_string(),
            Value::String(text) => text.clone(),
            Value::Agent(id) => format!("({})", world.describe(*id)),
            Value::AgentSet(set) => format!("(agentset, {} {}s)", set.count(world), set.kind()),
            Value::List(items) => {
                let rendered: Vec<String> = items.iter().map(|item| item.render(world)).collect();
                format!("[{}]", rendered.join(" "))
            }
        }
    }
}

fn render_number(num: f64) -> String {
    if num.is_finite() && num.fract() == 0.0 && num.abs() < 1e15 {
        format!("{:.0}", num)
    } else {
        num.to_string()
    }
}

impl From<f64> for Value {
    fn from(num: f64) -> Self {
        Value::Number(num)
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Value::Boolean(flag)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::String(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::AgentKind;

    #[test]
    fn test_render() {
        let mut world = World::new();
        let id = world.create_agent(AgentKind::Turtle, "turtles");

        assert_eq!(Value::Number(3.0).render(&world), "3");
        assert_eq!(Value::Number(2.5).render(&world), "2.5");
        assert_eq!(Value::Agent(id).render(&world), "(turtle 0)");
        assert_eq!(
            Value::List(vec![Value::from(true), Value::from("a"), Value::Nobody]).render(&world),
            "[true a nobody]"
        );
        assert_eq!(
            Value::AgentSet(AgentSet::turtles()).render(&world),
            "(agentset, 1 turtles)"
        );
    }
}
