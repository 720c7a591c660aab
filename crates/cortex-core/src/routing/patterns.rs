//! Classification pattern tables
//!
//! Plain data: each category scores one point per distinct pattern that
//! matches the lowercased message. Trigger lists are high-precision
//! shortcuts consulted by the precedence rules.

/// Code generation patterns
pub const CODE_GENERATION: &[&str] = &[
    r"write.*code",
    r"implement.*function",
    r"create.*script",
    r"debug.*code",
    r"fix.*bug",
    r"refactor",
    r"python.*code",
    r"javascript.*code",
    r"sql.*query",
    r"algorithm",
    r"function.*to",
    r"write.*function",
    r"create.*function",
    r"fibonacci",
    r"factorial",
    r"sorting",
    r"programming",
    r"python",
    r"javascript",
    r"java",
    r"c\+\+",
    r"c#",
    r"php",
    r"ruby",
    r"go",
    r"rust",
    r"swift",
    r"kotlin",
    r"typescript",
    r"html",
    r"css",
    r"build.*app",
    r"create.*program",
    r"develop",
    r"code.*for",
    r"script.*to",
    r"program.*that",
    r"software",
    r"application",
    r"web.*app",
    r"mobile.*app",
    r"api",
    r"database",
    r"backend",
    r"frontend",
    r"full.*stack",
    r"framework",
    r"library",
    r"class.*definition",
    r"method",
    r"variable",
    r"loop",
    r"condition",
    r"if.*else",
    r"for.*loop",
    r"while.*loop",
    r"try.*catch",
    r"import",
    r"package",
    r"module",
    r"namespace",
    r"object",
    r"array",
    r"list",
    r"dictionary",
    r"hash",
    r"json",
    r"xml",
    r"automate",
    r"parse",
    r"extract",
    r"process.*data",
    r"convert",
    r"transform",
    r"validate",
    r"authenticate",
    r"encrypt",
    r"decrypt",
    r"compress",
    r"decompress",
    r"serialize",
    r"deserialize",
    r"design.*pattern",
    r"mvc",
    r"rest.*api",
    r"graphql",
    r"microservice",
    r"docker",
    r"kubernetes",
    r"ci/cd",
    r"git",
    r"version.*control",
    r"test.*case",
    r"unit.*test",
    r"integration.*test",
    r"tdd",
    r"bdd",
];

/// Math and business-calculation patterns
pub const MATH_CALCULATION: &[&str] = &[
    r"calculate",
    r"solve.*equation",
    r"math.*problem",
    r"derivative",
    r"integral",
    r"statistics",
    r"probability",
    r"algebra",
    r"geometry",
    r"trigonometry",
    r"\d+.*\+.*\d+",
    r"what.*is.*\d+.*[-+*/].*\d+",
    r"solve.*this",
    r"step.*by.*step",
    r"cost.*effective",
    r"cost-effective",
    r"optimize",
    r"optimization",
    r"defect.*rate",
    r"percentage",
    r"percent",
    r"total.*cost",
    r"production.*rate",
    r"profit",
    r"loss",
    r"revenue",
    r"compare.*cost",
    r"versus",
    r"vs\.",
    r"which.*better",
    r"which.*cheaper",
    r"budget",
    r"financial",
    r"economic",
    r"efficiency",
    r"productivity",
    r"manufacturing",
    r"production",
    r"quality.*control",
    r"defects",
    r"units.*per",
    r"rate.*of",
    r"throughput",
    r"capacity",
    r"utilization",
    r"break.*even",
    r"roi",
    r"return.*on.*investment",
    r"margin",
    r"problem.*solving",
    r"word.*problem",
    r"scenario",
    r"situation",
    r"given.*that",
    r"if.*then",
    r"assuming",
    r"suppose",
    r"determine",
    r"find.*the",
    r"what.*would",
    r"how.*much",
    r"how.*many",
    r"minimum",
    r"maximum",
    r"optimal",
    r"best.*option",
];

/// Image analysis patterns
pub const IMAGE_ANALYSIS: &[&str] = &[
    r"analyze.*image",
    r"what.*in.*image",
    r"describe.*picture",
    r"read.*text.*image",
    r"handwriting",
    r"ocr",
    r"transcribe.*image",
];

/// Complex reasoning and architecture patterns
pub const COMPLEX_REASONING: &[&str] = &[
    r"explain.*complex",
    r"analyze.*deeply",
    r"compare.*contrast",
    r"pros.*cons",
    r"strategy",
    r"plan.*detailed",
    r"research",
    r"architecture",
    r"system.*design",
    r"microservices",
    r"database.*design",
    r"kubernetes",
    r"aws",
    r"deployment.*strategy",
    r"scalability",
    r"enterprise",
    r"cloud.*architecture",
    r"distributed.*system",
    r"load.*balancing",
    r"high.*availability",
    r"fault.*tolerance",
    r"disaster.*recovery",
    r"infrastructure",
    r"devops",
    r"ci.*cd",
    r"containerization",
    r"orchestration",
    r"service.*mesh",
    r"api.*gateway",
    r"message.*queue",
    r"event.*driven",
    r"caching.*strategy",
    r"cdn",
    r"performance.*optimization",
    r"security.*architecture",
    r"authentication.*system",
    r"authorization",
    r"data.*pipeline",
    r"etl",
    r"big.*data",
    r"analytics.*platform",
    r"monitoring.*system",
    r"logging.*architecture",
    r"observability",
    r"design.*database",
    r"design.*schema",
    r"schema.*design",
    r"data.*model",
    r"entity.*relationship",
    r"erd",
    r"normalization",
    r"denormalization",
    r"database.*architecture",
    r"data.*architecture",
];

/// Direct math/business triggers (precedence rule 1)
pub const MATH_TRIGGERS: &[&str] = &[
    r"calculate",
    r"solve.*this",
    r"step.*by.*step",
    r"optimize",
    r"cost.*effective",
    r"defect.*rate",
    r"production.*rate",
    r"total.*cost",
    r"profit",
    r"loss",
    r"percentage",
];

/// Direct architecture/system-design triggers (precedence rule 2)
pub const ARCHITECTURE_TRIGGERS: &[&str] = &[
    r"architecture",
    r"system.*design",
    r"microservices",
    r"database.*design",
    r"design.*database",
    r"design.*schema",
    r"schema.*design",
    r"scalability",
    r"enterprise",
    r"infrastructure",
    r"deployment.*strategy",
    r"kubernetes",
    r"aws",
    r"cloud.*architecture",
    r"distributed.*system",
];

/// Direct coding triggers (precedence rule 3)
pub const CODE_TRIGGERS: &[&str] = &[
    r"write.*code",
    r"implement.*function",
    r"create.*script",
    r"python",
    r"javascript",
    r"algorithm",
    r"program.*that",
    r"function.*to",
    r"automate",
    r"build.*app",
];

/// Keywords that escalate image analysis to the high-quality vision worker
pub const VISION_PRECISION_KEYWORDS: &[&str] = &[
    "analyze text",
    "handwriting",
    "details",
    "ocr",
    "read",
    "transcribe",
    "complex",
    "detailed",
];
