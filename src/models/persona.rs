/// One of the fixed analytical viewpoints used to parameterize a completion
/// request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentPersona {
    pub name: &'static str,
    pub description: &'static str,
}

/// The persona catalog, in the order analyses are produced for each article.
pub static PERSONAS: [AgentPersona; 4] = [
    AgentPersona {
        name: "Hawk Agent",
        description: "Hawkish Federal Reserve analyst who focuses on inflation risks and tightening bias",
    },
    AgentPersona {
        name: "Dove Agent",
        description: "Dovish Federal Reserve analyst who emphasizes employment and growth concerns",
    },
    AgentPersona {
        name: "Technical Agent",
        description: "Technical analyst who focuses on market structure and Fed-related trading patterns",
    },
    AgentPersona {
        name: "Rates Agent",
        description: "Fixed income specialist who analyzes yield curve and Fed policy implications",
    },
];
